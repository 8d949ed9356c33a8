//! Positional `%N%` templates used by the listing and error pages
//!
//! Escaping is left to the callers (`html_escape`); arguments are inserted
//! as given.

/// Replace `%0%`, `%1%`, ... with the matching argument
///
/// Single pass over the template: text coming from an argument is never
/// scanned for placeholders. Out-of-range placeholders stay as written.
pub fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let arg = (digits > 0 && after[digits..].starts_with('%'))
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|i| args.get(i));

        if let Some(arg) = arg {
            out.push_str(arg);
            rest = &after[digits + 1..];
        } else {
            out.push('%');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template() {
        let t = "<title>%0%</title><h1>%1%</h1>%0%";
        assert_eq!(fill_template(t, &["A", "B"]), "<title>A</title><h1>B</h1>A");
        assert_eq!(fill_template("%2%", &["x"]), "%2%");
        assert_eq!(fill_template("100% sure %0%", &["x"]), "100% sure x");
    }

    #[test]
    fn test_fill_template_does_not_nest() {
        assert_eq!(fill_template("%0%|%1%", &["%1%", "B"]), "%1%|B");
    }
}
