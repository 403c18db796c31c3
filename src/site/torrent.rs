//! Info-hash extraction from magnet links and `.torrent` files

use lava_torrent::torrent::v1::Torrent;
use url::Url;

use super::{Result, SiteError};

/// Identity of a torrent as far as a stream needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    /// 40-character lowercase hex
    pub info_hash: String,
    pub name: Option<String>,
    pub size: Option<u64>,
}

/// Read the `btih` hash, display name and exact length from a magnet URI
pub fn parse_magnet(uri: &str) -> Result<TorrentInfo> {
    let url = Url::parse(uri).map_err(|e| SiteError::InvalidMagnet(e.to_string()))?;
    if url.scheme() != "magnet" {
        return Err(SiteError::InvalidMagnet(format!("not a magnet URI: {}", uri)));
    }

    let mut info_hash = None;
    let mut name = None;
    let mut size = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "xt" => {
                if let Some(hash) = value.strip_prefix("urn:btih:") {
                    info_hash = normalize_btih(hash);
                }
            }
            "dn" => name = Some(value.trim().to_string()),
            "xl" => size = value.parse().ok(),
            _ => {}
        }
    }

    let info_hash = info_hash
        .ok_or_else(|| SiteError::InvalidMagnet(format!("no usable btih in {}", uri)))?;

    Ok(TorrentInfo {
        info_hash,
        name: name.filter(|n| !n.is_empty()),
        size,
    })
}

/// Parse a downloaded `.torrent` file
pub fn parse_torrent_file(bytes: &[u8]) -> Result<TorrentInfo> {
    let torrent = Torrent::read_from_bytes(bytes)
        .map_err(|e| SiteError::InvalidTorrent(e.to_string()))?;

    Ok(TorrentInfo {
        info_hash: torrent.info_hash().to_lowercase(),
        name: Some(torrent.name.clone()).filter(|n| !n.is_empty()),
        size: u64::try_from(torrent.length).ok(),
    })
}

/// Accept hex or base32 `btih` values and return lowercase hex
fn normalize_btih(hash: &str) -> Option<String> {
    let hash = hash.trim();
    match hash.len() {
        40 if hash.chars().all(|c| c.is_ascii_hexdigit()) => Some(hash.to_lowercase()),
        32 => base32_to_hex(hash),
        _ => None,
    }
}

/// RFC 4648 base32 (no padding) to lowercase hex
fn base32_to_hex(encoded: &str) -> Option<String> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

    let mut bytes = Vec::with_capacity(20);
    let mut buffer: u64 = 0;
    let mut bits = 0;

    for c in encoded.bytes() {
        let value = ALPHABET.iter().position(|&a| a == c.to_ascii_uppercase())? as u64;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Some(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single-file torrent: one 256 KiB piece of test.mkv
    const SAMPLE_TORRENT: &[u8] = b"d4:infod6:lengthi262144e4:name8:test.mkv12:piece lengthi262144e6:pieces20:\xe0\xe1\xe2\xe3\xe4\xe5\xe6\xe7\xe8\xe9\xea\xeb\xec\xed\xee\xef\xf0\xf1\xf2\xf3ee";
    const SAMPLE_HASH: &str = "851cbbe5765bedaf43b5e5f592c898029314f3b2";

    #[test]
    fn test_parse_hex_magnet() {
        let info = parse_magnet(
            "magnet:?xt=urn:btih:0123456789ABCDEF0123456789ABCDEF01234567&dn=Leo+%282023%29+1080p&xl=1024&tr=udp%3A%2F%2Ftracker.example%3A1337",
        )
        .unwrap();

        assert_eq!(info.info_hash, "0123456789abcdef0123456789abcdef01234567");
        assert_eq!(info.name.as_deref(), Some("Leo (2023) 1080p"));
        assert_eq!(info.size, Some(1024));
    }

    #[test]
    fn test_parse_base32_magnet() {
        let info = parse_magnet("magnet:?xt=urn:btih:AERUKZ4JVPG66AJDIVTYTK6N54ASGRLH").unwrap();
        assert_eq!(info.info_hash, "0123456789abcdef0123456789abcdef01234567");
        assert_eq!(info.name, None);
    }

    #[test]
    fn test_reject_bad_magnets() {
        assert!(parse_magnet("https://example.com/?xt=urn:btih:0123456789abcdef0123456789abcdef01234567").is_err());
        assert!(parse_magnet("magnet:?dn=no-hash").is_err());
        assert!(parse_magnet("magnet:?xt=urn:btih:tooshort").is_err());
    }

    #[test]
    fn test_parse_torrent_file() {
        let info = parse_torrent_file(SAMPLE_TORRENT).unwrap();
        assert_eq!(info.info_hash, SAMPLE_HASH);
        assert_eq!(info.name.as_deref(), Some("test.mkv"));
        assert_eq!(info.size, Some(262144));

        assert!(parse_torrent_file(b"<html>login</html>").is_err());
    }
}
