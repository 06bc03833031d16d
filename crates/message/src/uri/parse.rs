//! A lenient RFC 3986 uri splitter.
//!
//! The parser only splits a uri reference into its components, it does not
//! percent-decode or validate characters inside a component. The [`Uri`](super::Uri)
//! setters splice a single proposed component into a synthetic uri and read it back
//! through [`parse_url`], so every stored component is exactly what this parser
//! reports for it.
//!
//! Parsing fails (`None`) when an authority is present but has no host, or when the
//! port is not a decimal number in `0..=65535`.

/// Components of a uri reference, borrowed from the parsed input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Components<'a> {
    pub(crate) scheme: Option<&'a str>,
    pub(crate) user: Option<&'a str>,
    pub(crate) pass: Option<&'a str>,
    pub(crate) host: Option<&'a str>,
    pub(crate) port: Option<u16>,
    pub(crate) path: Option<&'a str>,
    pub(crate) query: Option<&'a str>,
    pub(crate) fragment: Option<&'a str>,
}

/// Splits `input` into its components.
pub(crate) fn parse_url(input: &str) -> Option<Components<'_>> {
    let mut components = Components::default();

    let rest = match input.split_once('#') {
        Some((rest, fragment)) => {
            components.fragment = Some(fragment);
            rest
        }
        None => input,
    };

    let rest = match rest.split_once('?') {
        Some((rest, query)) => {
            components.query = Some(query);
            rest
        }
        None => rest,
    };

    let rest = match split_scheme(rest) {
        Some((scheme, rest)) => {
            components.scheme = Some(scheme);
            rest
        }
        None => rest,
    };

    if let Some(hierarchy) = rest.strip_prefix("//") {
        let (authority, path) = match hierarchy.find('/') {
            Some(index) => hierarchy.split_at(index),
            None => (hierarchy, ""),
        };
        parse_authority(authority, &mut components)?;
        if !path.is_empty() {
            components.path = Some(path);
        }
    } else if !rest.is_empty() {
        components.path = Some(rest);
    }

    Some(components)
}

/// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, rest))
}

fn parse_authority<'a>(authority: &'a str, components: &mut Components<'a>) -> Option<()> {
    let host_port = match authority.rfind('@') {
        Some(index) => {
            let user_info = &authority[..index];
            match user_info.split_once(':') {
                Some((user, pass)) => {
                    components.user = Some(user);
                    components.pass = Some(pass);
                }
                None => components.user = Some(user_info),
            }
            &authority[index + 1..]
        }
        None => authority,
    };

    let (host, port) = if host_port.starts_with('[') {
        // ip literal, the port separator can only follow the closing bracket
        let end = host_port.find(']')?;
        let (host, rest) = host_port.split_at(end + 1);
        match rest {
            "" => (host, None),
            rest => (host, Some(rest.strip_prefix(':')?)),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    if host.is_empty() {
        return None;
    }
    components.host = Some(host);

    match port {
        None | Some("") => {}
        Some(port) => {
            if !port.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            components.port = Some(port.parse().ok()?);
        }
    }

    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_uri() {
        let components = parse_url("HTTPS://user:pa:ss@Example.com:8443/a/b?x=1&y=2#top").unwrap();

        assert_eq!(components.scheme, Some("HTTPS"));
        assert_eq!(components.user, Some("user"));
        assert_eq!(components.pass, Some("pa:ss"));
        assert_eq!(components.host, Some("Example.com"));
        assert_eq!(components.port, Some(8443));
        assert_eq!(components.path, Some("/a/b"));
        assert_eq!(components.query, Some("x=1&y=2"));
        assert_eq!(components.fragment, Some("top"));
    }

    #[test]
    fn relative_reference() {
        let components = parse_url("/index.html?a=1").unwrap();

        assert_eq!(components.scheme, None);
        assert_eq!(components.host, None);
        assert_eq!(components.path, Some("/index.html"));
        assert_eq!(components.query, Some("a=1"));
        assert_eq!(components.fragment, None);
    }

    #[test]
    fn fragment_may_contain_question_mark() {
        let components = parse_url("scheme://host#frag?not-a-query").unwrap();

        assert_eq!(components.query, None);
        assert_eq!(components.fragment, Some("frag?not-a-query"));
    }

    #[test]
    fn ip_literal() {
        let components = parse_url("http://[::1]:8080/").unwrap();

        assert_eq!(components.host, Some("[::1]"));
        assert_eq!(components.port, Some(8080));
        assert_eq!(components.path, Some("/"));
    }

    #[test]
    fn invalid_scheme_is_a_path() {
        let components = parse_url("1http:rest").unwrap();

        assert_eq!(components.scheme, None);
        assert_eq!(components.path, Some("1http:rest"));
    }

    #[test]
    fn failures() {
        assert_eq!(parse_url("scheme://"), None);
        assert_eq!(parse_url("scheme://:80"), None);
        assert_eq!(parse_url("scheme://host:99999"), None);
        assert_eq!(parse_url("scheme://host:8o"), None);
        assert_eq!(parse_url("scheme://[::1"), None);
    }
}
