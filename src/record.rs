use crate::metadata::Metadata;
use std::io::Write as _;

/// Fixed header line. Always written raw, even when the record stream that
/// follows it is compressed, so tooling probing the first line still works.
pub const HEADER: &[u8] = b"inode,parent-inode,directory-depth,\"filename\",\"fileExtension\",UID,GID,st_size,st_dev,st_blocks,st_nlink,\"st_mode\",st_atime,st_mtime,st_ctime,pw_fcount,pw_dirsum\n";

/// `pw_fcount` sentinel marking a plain entry record (not a directory summary).
pub const ENTRY_FCOUNT: i64 = -1;

/// Substring after the final path separator, or the whole path if none.
#[inline]
#[must_use]
pub fn basename(path: &[u8]) -> &[u8] {
    path.iter()
        .rposition(|&byte| byte == b'/')
        .map_or(path, |pos| &path[pos + 1..])
}

/// Substring after the final dot, unless that dot starts the filename.
#[inline]
#[must_use]
pub fn extension(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&byte| byte == b'.') {
        Some(pos) if pos > 0 => &name[pos + 1..],
        _ => b"",
    }
}

/// Double-quote wrap with embedded quotes doubled. No other escaping.
#[inline]
fn push_quoted(out: &mut Vec<u8>, field: &[u8]) {
    out.push(b'"');
    for &byte in field {
        if byte == b'"' {
            out.push(b'"');
        }
        out.push(byte);
    }
    out.push(b'"');
}

/**
Appends one 17-field record line to `out`.

`fcount`/`dirsum` are `(-1, 0)` for entry records; for a directory summary
they carry the count of direct children considered and the byte sum of the
non-directory children. The filename and extension are derived from the raw
path bytes so non-UTF8 names round-trip untouched.
*/
pub fn encode_record(
    out: &mut Vec<u8>,
    path: &[u8],
    meta: &Metadata,
    parent_inode: u64,
    depth: i64,
    fcount: i64,
    dirsum: u64,
) {
    let name = basename(path);

    // writes to a Vec cannot fail
    let _ = write!(out, "{},{parent_inode},{depth},", meta.ino);
    push_quoted(out, name);
    out.push(b',');
    push_quoted(out, extension(name));
    let _ = writeln!(
        out,
        ",{},{},{},{},{},{},\"{:o}\",{},{},{},{fcount},{dirsum}",
        meta.uid,
        meta.gid,
        meta.size,
        meta.dev,
        meta.blocks,
        meta.nlink,
        meta.mode,
        meta.atime,
        meta.mtime,
        meta.ctime,
    );
}
