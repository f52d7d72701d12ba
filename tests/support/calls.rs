//! Assertions over recorded platform calls.

use rigger::testkit::platform::PlatformCall;

/// Service a call was about, if any.
pub fn target(call: &PlatformCall) -> Option<&str> {
    match call {
        PlatformCall::Register { name, .. }
        | PlatformCall::Update { name }
        | PlatformCall::Deploy { name, .. }
        | PlatformCall::Runtime { name }
        | PlatformCall::Delete { name, .. }
        | PlatformCall::AddDomain { name, .. }
        | PlatformCall::EnableTls { name, .. } => Some(name.as_str()),
        PlatformCall::SystemInfo | PlatformCall::ListApps | PlatformCall::Backup => None,
    }
}

/// Index of the first call about `service`.
pub fn first_call(calls: &[PlatformCall], service: &str) -> usize {
    calls
        .iter()
        .position(|call| target(call) == Some(service))
        .unwrap_or_else(|| panic!("no call for {service}"))
}

/// Index of the last call about `service`.
pub fn last_call(calls: &[PlatformCall], service: &str) -> usize {
    calls
        .iter()
        .rposition(|call| target(call) == Some(service))
        .unwrap_or_else(|| panic!("no call for {service}"))
}

/// Assert every call about `dependency` happened before any call about `dependent`.
pub fn assert_completed_before(calls: &[PlatformCall], dependency: &str, dependent: &str) {
    let done = last_call(calls, dependency);
    let started = first_call(calls, dependent);
    assert!(
        done < started,
        "{dependency} (last call #{done}) must finish before {dependent} starts (#{started})\ncalls: {calls:#?}"
    );
}
