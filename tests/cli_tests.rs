//! CLI integration tests
//!
//! These tests run the built binary against schemas written to a temporary
//! directory.

#![cfg(feature = "cli")]

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

fn wsdl_types_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wsdl-types"))
}

const SHOP: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:s="urn:shop" targetNamespace="urn:shop">
  <xs:group name="Addr">
    <xs:sequence>
      <xs:element name="street" type="xs:string"/>
      <xs:element name="city" type="xs:string" minOccurs="0"/>
    </xs:sequence>
  </xs:group>
  <xs:complexType name="Customer">
    <xs:sequence><xs:group ref="s:Addr"/></xs:sequence>
  </xs:complexType>
</xs:schema>"#;

fn fixture(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.xsd");
    fs::write(&path, content).unwrap();
    (dir, path)
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_summary() {
    let (_dir, path) = fixture(SHOP);
    let output = Command::new(wsdl_types_bin())
        .args(["inspect", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("wsdl-types"), "should show version");
    assert!(stdout.contains("urn:shop"), "should show namespace");
    assert!(stdout.contains("Groups: 1"), "should count groups");
    assert!(stdout.contains("{urn:shop}Addr"), "should list groups");
}

#[test]
fn test_cli_inspect_group() {
    let (_dir, path) = fixture(SHOP);
    let output = Command::new(wsdl_types_bin())
        .args(["inspect", "--group", "Addr", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    let street = stdout.find("element street").expect("street listed");
    let city = stdout.find("element city").expect("city listed");
    assert!(street < city, "members keep document order");
    assert!(stdout.contains("[0..1]"));
}

#[test]
fn test_cli_inspect_json() {
    let (_dir, path) = fixture(SHOP);
    let output = Command::new(wsdl_types_bin())
        .args(["inspect", "--json", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["groups"][0]["qualified_name"], "{urn:shop}Addr");
    assert_eq!(json["complex_types"][0]["members"][0]["kind"], "group");
}

#[test]
fn test_cli_fails_on_unresolved_reference() {
    let (_dir, path) = fixture(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:s="urn:shop" targetNamespace="urn:shop">
  <xs:element name="e" type="s:Nowhere"/>
</xs:schema>"#,
    );
    let output = Command::new(wsdl_types_bin())
        .args(["inspect", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("{urn:shop}Nowhere"), "stderr: {}", stderr);
}

#[test]
fn test_cli_lax_mode() {
    let (_dir, path) = fixture(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:shop">
  <xs:group name="G"><xs:sequence><xs:attribute name="a"/></xs:sequence></xs:group>
</xs:schema>"#,
    );
    let strict = Command::new(wsdl_types_bin())
        .args(["inspect", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    assert!(!strict.status.success());

    let lax = Command::new(wsdl_types_bin())
        .args(["inspect", "--lax", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    assert!(lax.status.success());
}
