//! Identifier case conversions.
//!
//! Words are split only where an ASCII lowercase letter is directly followed
//! by an ASCII uppercase letter, so runs of capitals stay together
//! (`UserID` becomes `user_id`, `HTTPServer` becomes `httpserver`).

/// Converts a Go identifier to the schema's snake case.
///
/// Idempotent on snake-case input.
pub fn to_schema_case(ident: &str) -> String {
    words(ident)
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts a schema field name to the Go field name protoc-gen-go
/// generates for it.
///
/// A `_` before a lowercase letter is dropped and the letter capitalized;
/// any other `_` is kept, except a leading one, which becomes `X`. A
/// lowercase letter after anything but a lowercase letter is capitalized,
/// so `v2beta` becomes `V2Beta` and `a_1` becomes `A_1`.
///
/// For camel case without acronyms or digits this inverts
/// [`to_schema_case`].
pub fn to_exported_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
        match c {
            '_' if i == 0 => out.push('X'),
            '_' if next_lower => {}
            c if c.is_ascii_digit() => out.push(c),
            c => {
                out.push(c.to_ascii_uppercase());
                while chars.get(i + 1).is_some_and(char::is_ascii_lowercase) {
                    i += 1;
                    out.push(chars[i]);
                }
            }
        }
        i += 1;
    }
    out
}

/// Name of the generated service: first character uppercased, the rest
/// lowercased.
pub fn service_name(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>()
                + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

/// Splits at every lowercase-to-uppercase boundary.
fn words(ident: &str) -> impl Iterator<Item = &str> {
    let bytes = ident.as_bytes();
    let mut bounds: Vec<usize> = (1..bytes.len())
        .filter(|&i| {
            bytes[i].is_ascii_uppercase() && bytes[i - 1].is_ascii_lowercase()
        })
        .collect();
    bounds.push(ident.len());

    let mut start = 0;
    bounds.into_iter().map(move |end| {
        let word = &ident[start..end];
        start = end;
        word
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_schema_case() {
        assert_eq!(to_schema_case("ID"), "id");
        assert_eq!(to_schema_case("Name"), "name");
        assert_eq!(to_schema_case("UserID"), "user_id");
        assert_eq!(to_schema_case("createdAt"), "created_at");
        assert_eq!(to_schema_case("HTTPServer"), "httpserver");
        assert_eq!(to_schema_case("res0"), "res0");
        assert_eq!(to_schema_case(""), "");
    }

    #[test]
    fn test_exported_case() {
        assert_eq!(to_exported_case("id"), "Id");
        assert_eq!(to_exported_case("user_id"), "UserId");
        assert_eq!(to_exported_case("res0"), "Res0");
        assert_eq!(to_exported_case("createdAt"), "CreatedAt");
        assert_eq!(to_exported_case("_x__y_"), "XX_Y_");
    }

    #[test]
    fn test_exported_case_digits_and_underscores() {
        assert_eq!(to_exported_case("v2beta"), "V2Beta");
        assert_eq!(to_exported_case("a_1"), "A_1");
        assert_eq!(to_exported_case("page_2_size"), "Page_2Size");
        assert_eq!(to_exported_case("ids"), "Ids");
        assert_eq!(to_exported_case(""), "");
    }

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("users"), "Users");
        assert_eq!(service_name("USER_api"), "User_api");
        assert_eq!(service_name(""), "");
    }

    proptest! {
        #[test]
        fn test_schema_case_idempotent_on_snake(
            s in "[a-z][a-z0-9]{0,6}(_[a-z][a-z0-9]{0,6}){0,3}"
        ) {
            prop_assert_eq!(to_schema_case(&s), s);
        }

        #[test]
        fn test_exported_inverts_schema_case(s in "([A-Z][a-z]{1,6}){1,4}") {
            prop_assert_eq!(to_exported_case(&to_schema_case(&s)), s);
        }
    }
}
