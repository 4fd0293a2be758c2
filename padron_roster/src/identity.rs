use std::fmt::Display;

/// Canonical identity key of a CI (cédula de identidad).
///
/// Everything that is not an ASCII digit is dropped, so that `"1.234.567-8"`,
/// `"12345678"` and `12345678` all map to the same key.
///
/// ```
/// use padron_roster::normalize_ci;
///
/// assert_eq!(normalize_ci("123.456-7"), "1234567");
/// assert_eq!(normalize_ci(&1234567), "1234567");
/// ```
pub fn normalize_ci<T: Display + ?Sized>(raw: &T) -> String {
    raw.to_string()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Same as [`normalize_ci`], with missing values mapping to the empty key.
pub fn normalize_opt_ci<T: Display>(raw: Option<T>) -> String {
    match raw {
        Some(x) => normalize_ci(&x),
        None => String::new(),
    }
}

/// Two identities are the same person if their keys are equal and not empty.
pub fn same_identity(a: &str, b: &str) -> bool {
    let ka = normalize_ci(a);
    !ka.is_empty() && ka == normalize_ci(b)
}
