//! Listing of the builtin function table

use crate::builtins::BUILTINS;

/// One line per builtin: name, argument count and a short summary.
pub fn functions_listing() -> String {
    let width = BUILTINS.iter().map(|b| b.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for builtin in BUILTINS.iter() {
        let signature = format!("{}/{}", builtin.name, builtin.arity);
        out.push_str(&format!("{:<w$}  {}\n", signature, builtin.summary, w = width + 3));
    }
    out
}

#[test]
fn test_listing_covers_every_builtin() {
    let listing = functions_listing();
    assert_eq!(listing.lines().count(), BUILTINS.len());
    assert!(listing.contains("In/2+"));
    assert!(listing.contains("Pow/2"));
}
