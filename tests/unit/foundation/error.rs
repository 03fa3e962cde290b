use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TableError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        TableError::resolve("x")
            .to_string()
            .contains("resolution error:")
    );
    assert!(TableError::render("x").to_string().contains("render error:"));
    assert!(
        TableError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TableError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
