use crate::types::{Header, Limits, Method, ParseError, ParseErrorKind, Request};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    NeedMore,
    Complete(Request),
    Error(ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Method,
    Uri,
    Version,
    Headers,
}

/// Incremental request parser fed one TCP read at a time.
///
/// State persists across calls to [`push`](Self::push); the byte cursor does
/// not. Non-body tokens (method, URI, version, header names and values) are
/// copied out of the current chunk only, so the wire contract requires every
/// such token — including the double-CRLF header terminator and the header
/// value preceding it — to arrive within a single read. A token split across
/// reads is truncated to the bytes of the chunk that completed it, never
/// reassembled. Body bytes are the exception: they are written through a
/// cumulative cursor and may span any number of reads.
#[derive(Debug)]
pub struct RequestParser {
    field: Field,
    seeking: u8,
    word_len: usize,
    in_body: bool,
    saw_terminator: bool,
    skip_terminator: bool,
    header_open: bool,
    content_length_seen: bool,
    body_cursor: usize,
    limits: Limits,
    request: Request,
}

impl RequestParser {
    pub fn new(limits: Limits) -> Self {
        Self {
            field: Field::Method,
            seeking: b' ',
            word_len: 0,
            in_body: false,
            saw_terminator: false,
            skip_terminator: false,
            header_open: false,
            content_length_seen: false,
            body_cursor: 0,
            limits,
            request: Request::default(),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> ParseStatus {
        match self.consume(chunk) {
            Ok(()) if self.is_complete() => {
                ParseStatus::Complete(std::mem::take(&mut self.request))
            }
            Ok(()) => ParseStatus::NeedMore,
            Err(error) => ParseStatus::Error(error),
        }
    }

    fn is_complete(&self) -> bool {
        if !self.saw_terminator {
            return false;
        }
        if self.request.method != Method::Post {
            return true;
        }
        self.body_cursor >= self.request.body_length
    }

    fn consume(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let mut pos = 0usize;
        while pos < chunk.len() {
            let byte = chunk[pos];

            if self.in_body {
                match self.request.body.as_mut() {
                    None => {
                        return Err(ParseError {
                            kind: ParseErrorKind::BodyNotAllocated,
                        });
                    }
                    Some(body) => {
                        if self.skip_terminator {
                            self.skip_terminator = false;
                            self.body_cursor = 0;
                            continue;
                        }
                        if self.body_cursor >= body.len() {
                            return Err(ParseError {
                                kind: ParseErrorKind::BodyOverflow,
                            });
                        }
                        body[self.body_cursor] = byte;
                        self.body_cursor += 1;
                        pos += 1;
                    }
                }
                continue;
            }

            if byte == self.seeking {
                self.on_delimiter(byte, chunk, pos)?;
                // Skip the rest of the just-detected header terminator.
                if self.in_body {
                    pos += 3;
                }
            } else {
                self.word_len += 1;
                if self.word_len >= self.limits.max_token_bytes {
                    return Err(ParseError {
                        kind: ParseErrorKind::TokenTooLong,
                    });
                }
            }
            pos += 1;
        }
        Ok(())
    }

    fn on_delimiter(&mut self, byte: u8, chunk: &[u8], pos: usize) -> Result<(), ParseError> {
        match self.field {
            Field::Method => {
                let name = self.take_token(chunk, pos);
                self.request.method = Method::from_name(&name);
                self.field = Field::Uri;
            }
            Field::Uri => {
                self.request.uri = self.take_token(chunk, pos);
                self.field = Field::Version;
                self.seeking = b'\r';
            }
            Field::Version => {
                self.request.version = self.take_token(chunk, pos);
                self.field = Field::Headers;
                self.seeking = b'\n';
            }
            Field::Headers => match byte {
                b'\n' => self.seeking = b':',
                b':' => {
                    if self.header_open {
                        return Err(ParseError {
                            kind: ParseErrorKind::IncompleteHeader,
                        });
                    }
                    let name = self.take_token(chunk, pos);
                    self.request.headers.push(Header {
                        name,
                        value: String::new(),
                    });
                    self.header_open = true;
                    self.seeking = b' ';
                }
                b' ' => self.seeking = b'\r',
                _ => {
                    if !self.header_open {
                        return Err(ParseError {
                            kind: ParseErrorKind::HeaderValueWithoutName,
                        });
                    }
                    let value = self.take_token(chunk, pos);
                    self.close_header(value)?;
                    self.seeking = b'\n';

                    // Look ahead for the end of the header block. The whole
                    // four-byte sequence must sit inside the current chunk.
                    if pos + 3 < chunk.len() && &chunk[pos..pos + 4] == HEADER_TERMINATOR {
                        self.in_body = true;
                        self.saw_terminator = true;
                        self.skip_terminator = true;
                    }
                }
            },
        }
        Ok(())
    }

    /// Copies the token accumulated before `pos` out of the current chunk.
    /// When the token started in an earlier chunk, only the bytes of this
    /// chunk are available — the rest is gone (see the type-level note).
    fn take_token(&mut self, chunk: &[u8], pos: usize) -> String {
        let start = pos.saturating_sub(self.word_len);
        self.word_len = 0;
        String::from_utf8_lossy(&chunk[start..pos]).into_owned()
    }

    fn close_header(&mut self, value: String) -> Result<(), ParseError> {
        self.header_open = false;
        let header = match self.request.headers.last_mut() {
            Some(header) => header,
            None => {
                return Err(ParseError {
                    kind: ParseErrorKind::HeaderValueWithoutName,
                });
            }
        };
        header.value = value;

        if !self.content_length_seen && header.name.eq_ignore_ascii_case("content-length") {
            self.content_length_seen = true;
            let declared = header.value.trim().parse::<usize>().unwrap_or(0);
            if declared > self.limits.max_body_bytes {
                return Err(ParseError {
                    kind: ParseErrorKind::ContentLengthTooLarge,
                });
            }
            self.request.body_length = declared;
            if declared > 0 {
                self.request.body = Some(vec![0u8; declared]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseStatus, RequestParser};
    use crate::types::{Limits, Method, ParseErrorKind, Request};

    fn parse_chunks(chunks: &[&[u8]]) -> ParseStatus {
        let mut parser = RequestParser::new(Limits::default());
        let mut status = ParseStatus::NeedMore;
        for chunk in chunks {
            status = parser.push(chunk);
            if !matches!(status, ParseStatus::NeedMore) {
                break;
            }
        }
        status
    }

    fn complete(status: ParseStatus) -> Request {
        match status {
            ParseStatus::Complete(request) => request,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    fn error_kind(status: ParseStatus) -> ParseErrorKind {
        match status {
            ParseStatus::Error(error) => error.kind,
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn parses_get_request_in_one_chunk() {
        let request = complete(parse_chunks(&[
            b"GET /commands HTTP/1.0\r\nhost: example.com\r\naccept: */*\r\n\r\n",
        ]));

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.uri, "/commands");
        assert_eq!(request.version, "HTTP/1.0");
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers[0].name, "host");
        assert_eq!(request.headers[0].value, "example.com");
        assert_eq!(request.headers[1].name, "accept");
        assert!(request.body.is_none());
    }

    #[test]
    fn chunked_delivery_matches_single_read_when_tokens_stay_whole() {
        let whole = complete(parse_chunks(&[
            b"GET /commands HTTP/1.0\r\nhost: example.com\r\n\r\n",
        ]));
        let split = complete(parse_chunks(&[
            b"GET /commands HTTP/1.0\r\n",
            b"host: example.com\r\n\r\n",
        ]));

        assert_eq!(whole, split);
    }

    #[test]
    fn post_body_reassembles_across_arbitrary_splits() {
        let head = b"POST /event HTTP/1.0\r\ncontent-length: 11\r\n\r\n";
        let whole = complete(parse_chunks(&[&[head as &[u8], b"hello space"].concat()]));
        let split = complete(parse_chunks(&[head, b"hel", b"lo ", b"spac", b"e"]));

        assert_eq!(whole.body.as_deref(), Some(b"hello space" as &[u8]));
        assert_eq!(whole, split);
    }

    #[test]
    fn post_completes_exactly_at_declared_length() {
        let mut parser = RequestParser::new(Limits::default());
        assert_eq!(
            parser.push(b"POST /event HTTP/1.0\r\ncontent-length: 4\r\n\r\nab"),
            ParseStatus::NeedMore
        );
        let request = complete(parser.push(b"cd"));

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body_length, 4);
        assert_eq!(request.body.as_deref(), Some(b"abcd" as &[u8]));
    }

    #[test]
    fn post_without_content_length_completes_with_no_body() {
        let request = complete(parse_chunks(&[
            b"POST /event HTTP/1.0\r\nhost: example.com\r\n\r\n",
        ]));

        assert_eq!(request.method, Method::Post);
        assert!(request.body.is_none());
        assert_eq!(request.body_length, 0);
    }

    #[test]
    fn oversized_content_length_is_rejected_before_any_body_byte() {
        let status = parse_chunks(&[b"POST /event HTTP/1.0\r\ncontent-length: 8388609\r\n\r\n"]);
        assert_eq!(error_kind(status), ParseErrorKind::ContentLengthTooLarge);
    }

    #[test]
    fn content_length_at_the_limit_is_accepted() {
        let mut parser = RequestParser::new(Limits::default());
        let status = parser.push(b"POST /event HTTP/1.0\r\ncontent-length: 8388608\r\n\r\n");
        assert_eq!(status, ParseStatus::NeedMore);
    }

    #[test]
    fn overlong_token_is_rejected() {
        let mut raw = Vec::from(&b"GET /"[..]);
        raw.extend(std::iter::repeat_n(b'a', 2100));
        raw.extend_from_slice(b" HTTP/1.0\r\n\r\n");

        assert_eq!(error_kind(parse_chunks(&[&raw])), ParseErrorKind::TokenTooLong);
    }

    #[test]
    fn body_bytes_past_declared_length_are_rejected() {
        let status = parse_chunks(&[b"POST /event HTTP/1.0\r\ncontent-length: 3\r\n\r\nabcd"]);
        assert_eq!(error_kind(status), ParseErrorKind::BodyOverflow);
    }

    #[test]
    fn trailing_bytes_without_an_allocated_body_are_rejected() {
        let status = parse_chunks(&[b"GET / HTTP/1.0\r\nhost: x\r\n\r\ntrailing"]);
        assert_eq!(error_kind(status), ParseErrorKind::BodyNotAllocated);
    }

    // Pins the wire contract: a token split across two reads is truncated to
    // the bytes of the chunk that completed it, not reassembled.
    #[test]
    fn token_split_across_reads_is_not_reassembled() {
        let request = complete(parse_chunks(&[
            b"GET /comm",
            b"ands HTTP/1.0\r\nhost: x\r\n\r\n",
        ]));

        assert_eq!(request.uri, "ands");
    }

    // Pins the companion constraint: the double-CRLF terminator is only
    // detected when it sits in one chunk together with the final header value.
    #[test]
    fn terminator_split_from_its_header_line_is_not_detected() {
        let mut parser = RequestParser::new(Limits::default());
        assert_eq!(
            parser.push(b"GET / HTTP/1.0\r\nhost: example.com\r\n"),
            ParseStatus::NeedMore
        );
        assert_eq!(parser.push(b"\r\n"), ParseStatus::NeedMore);
    }

    // Pins the zero-header boundary: the double CRLF is only recognized at a
    // header-value delimiter, so a request with no header lines never
    // reaches a terminator and never completes.
    #[test]
    fn request_without_headers_never_completes() {
        let mut parser = RequestParser::new(Limits::default());
        assert_eq!(
            parser.push(b"GET /commands HTTP/1.0\r\n\r\n"),
            ParseStatus::NeedMore
        );
        assert_eq!(parser.push(b"\r\n"), ParseStatus::NeedMore);
    }

    #[test]
    fn repeated_content_length_keeps_the_first_declaration() {
        let head = b"POST /event HTTP/1.0\r\ncontent-length: 2\r\ncontent-length: 9\r\n\r\n";
        let mut parser = RequestParser::new(Limits::default());
        assert_eq!(parser.push(head), ParseStatus::NeedMore);
        let request = complete(parser.push(b"ok"));

        assert_eq!(request.body_length, 2);
        assert_eq!(request.body.as_deref(), Some(b"ok" as &[u8]));
    }

    #[test]
    fn unknown_method_completes_at_terminator() {
        let request = complete(parse_chunks(&[b"DELETE /x HTTP/1.0\r\nhost: x\r\n\r\n"]));
        assert_eq!(request.method, Method::Unset);
        assert_eq!(request.uri, "/x");
    }

    #[test]
    fn headers_keep_insertion_order() {
        let request = complete(parse_chunks(&[
            b"GET / HTTP/1.0\r\nzeta: 1\r\nalpha: 2\r\nmid: 3\r\n\r\n",
        ]));
        let names: Vec<&str> = request
            .headers
            .iter()
            .map(|header| header.name.as_str())
            .collect();

        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(request.header("ALPHA"), Some("2"));
    }
}
