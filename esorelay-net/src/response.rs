use crate::buffer::ByteBuilder;

pub const SERVER_NAME: &str = "cringinx";
pub const CONTENT_PLAIN: &str = "text/plain";
pub const CONTENT_HTML: &str = "text/html";
pub const CONTENT_JSON: &str = "application/json";

const CRLF: &[u8] = b"\r\n";
const STATUS_OK: &str = "200 OK";
const STATUS_NOT_FOUND: &str = "404 NOT FOUND";

/// The fixed 404 page. 146 bytes on the wire: the trailing NUL has always
/// been counted in the advertised length and existing clients expect it.
pub const NOT_FOUND_BODY: &[u8] = b"<html><head><title>404 Not Found</title></head>\n<body>\n<center><h1>404 Not Found</h1></center>\n<hr><center>cringinx/3.22</center>\n</body>\n</html>\0";

fn status_line(out: &mut ByteBuilder, status: &str) {
    out.append(b"HTTP/1.0 ");
    out.append(status.as_bytes());
    out.append(CRLF);
}

fn add_header(out: &mut ByteBuilder, name: &str, value: &str) {
    out.append(name.as_bytes());
    out.append(b": ");
    out.append(value.as_bytes());
    out.append(CRLF);
}

fn common_headers(out: &mut ByteBuilder) {
    add_header(out, "server", SERVER_NAME);
    add_header(out, "access-control-allow-origin", "*");
    add_header(out, "access-control-allow-headers", "*");
}

pub fn respond_text(out: &mut ByteBuilder, body: &[u8], content_type: &str) {
    status_line(out, STATUS_OK);
    common_headers(out);
    out.append_fmt(format_args!("content-length: {}\r\n", body.len()));
    add_header(out, "content-type", content_type);
    out.append(CRLF);
    out.append(body);
}

pub fn respond_options(out: &mut ByteBuilder, allowed_methods: &str) {
    status_line(out, STATUS_OK);
    add_header(out, "allow", allowed_methods);
    common_headers(out);
    out.append(CRLF);
}

pub fn not_found(out: &mut ByteBuilder) {
    status_line(out, STATUS_NOT_FOUND);
    common_headers(out);
    out.append_fmt(format_args!("content-length: {}\r\n", NOT_FOUND_BODY.len()));
    add_header(out, "content-type", CONTENT_HTML);
    out.append(CRLF);
    out.append(NOT_FOUND_BODY);
}
