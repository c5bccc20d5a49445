mod ring_bytes;

pub use ring_bytes::RingBytes;

/// Render an argument vector for log and error messages.
pub fn display_argv(program: &str, args: &[String]) -> String {
    let mut out = String::from(program);
    for arg in args {
        out.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            out.push('\'');
            out.push_str(arg);
            out.push('\'');
        } else {
            out.push_str(arg);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_argv_quotes_spaces() {
        let args = vec!["--build".to_string(), "my dir".to_string()];
        assert_eq!(display_argv("cmake", &args), "cmake --build 'my dir'");
    }
}
