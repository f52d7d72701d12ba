//! Builders for domain values and sample manifests used across tests.

use crate::domain::{AppName, Bundle, ServiceExtras, ServiceSpec};

/// An image-based service with the given dependencies.
pub fn service(name: &str, depends_on: &[&str]) -> ServiceSpec {
    ServiceSpec {
        name: AppName::parse(name).unwrap(),
        image: Some(format!("{name}:latest")),
        depends_on: depends_on.iter().map(|dep| dep.to_string()).collect(),
        environment: Vec::new(),
        volumes: Vec::new(),
        extras: ServiceExtras::default(),
    }
}

/// A bundle of services in the given discovery order.
pub fn bundle(services: Vec<ServiceSpec>) -> Bundle {
    Bundle {
        services,
        ..Bundle::default()
    }
}

/// Database plus web app, where the app depends on the database.
pub const BLOG_MANIFEST: &str = r#"
captainVersion: 4
services:
  $$cap_appname-db:
    image: mariadb:$$cap_db_version
    volumes:
      - $$cap_appname-db-data:/var/lib/mysql
    environment:
      MYSQL_ROOT_PASSWORD: $$cap_db_pass
    caproverExtra:
      notExposeAsWebApp: 'true'
  $$cap_appname:
    depends_on:
      - $$cap_appname-db
    image: ghost:latest
    environment:
      DB_HOST: srv-captain--$$cap_appname-db
      DB_PASSWORD: $$cap_db_pass
      URL: https://$$cap_appname.$$cap_root_domain
    caproverExtra:
      containerHttpPort: '2368'
caproverOneClickApp:
  displayName: Blog
  instructions:
    start: A blog with its own database.
    end: Your blog is available at https://$$cap_appname.$$cap_root_domain
  variables:
    - id: $$cap_db_version
      label: Database version
      defaultValue: '10.11'
    - id: $$cap_db_pass
      label: Database password
      defaultValue: $$cap_gen_random_hex(16)
"#;

/// Two services that depend on each other.
pub const CYCLE_MANIFEST: &str = r#"
captainVersion: 4
services:
  x:
    image: busybox
    depends_on:
      - y
  y:
    image: busybox
    depends_on:
      - x
"#;
