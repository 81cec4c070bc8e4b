/// Line terminator style of a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// CRLF when the content has at least one `\n` and every `\n` is preceded by `\r`,
    /// otherwise LF. Splitting on the detected terminator and joining again with it is lossless
    /// either way: in an LF file a stray `\r` simply stays part of its line.
    pub fn detect(content: &str) -> LineEnding {
        let bytes = content.as_bytes();
        let mut lf = 0usize;
        let mut crlf = 0usize;
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                lf += 1;
                if i > 0 && bytes[i - 1] == b'\r' {
                    crlf += 1;
                }
            }
        }
        if lf > 0 && crlf == lf {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }
}
