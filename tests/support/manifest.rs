//! Manifest documents built from a service/dependency list.

/// A bundle of image services in the given order.
pub fn with_dependencies(services: &[(&str, &[&str])]) -> String {
    let mut doc = String::from("captainVersion: 4\nservices:\n");
    for (name, deps) in services {
        doc.push_str(&format!("  {name}:\n    image: {name}:latest\n"));
        if !deps.is_empty() {
            doc.push_str("    depends_on:\n");
            for dep in *deps {
                doc.push_str(&format!("      - {dep}\n"));
            }
        }
    }
    doc
}
