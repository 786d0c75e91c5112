/// Converts a kebab-case name to camelCase, e.g. `foo-bar` -> `fooBar`
pub fn camelize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut uppercase_next = false;

    for c in s.chars() {
        if c == '-' {
            uppercase_next = true;
        } else if uppercase_next {
            uppercase_next = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Uppercases the first character, e.g. `fooBar` -> `FooBar`
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();

    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Converts a name to PascalCase, e.g. `foo-bar` -> `FooBar`
pub fn pascalize(s: &str) -> String {
    capitalize(&camelize(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_camelizes() {
        assert_eq!("fooBar", camelize("foo-bar"));
        assert_eq!("fooBarBaz", camelize("foo-bar-baz"));
        assert_eq!("foo", camelize("foo"));
        assert_eq!("fooBar", camelize("fooBar"));
    }

    #[test]
    fn it_pascalizes() {
        assert_eq!("FooBar", pascalize("foo-bar"));
        assert_eq!("DynamicStyle", pascalize("dynamic-style"));
        assert_eq!("Foo", pascalize("foo"));
        assert_eq!("FooBar", pascalize("fooBar"));
    }
}
