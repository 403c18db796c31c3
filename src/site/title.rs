//! Release title parsing
//!
//! Topic and attachment titles follow the loose convention
//! `Name (Year) Language Quality - Resolution - Codec - Size - Subs`.

use regex::Regex;
use std::sync::LazyLock;

use super::{Language, VideoType};

/// A topic title split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTitle {
    pub name: String,
    pub year: Option<i32>,
    /// Everything after the name and year
    pub details: String,
}

// "Name (2023) details" or "Name [2023] - details"
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s*[\(\[](?P<year>(?:19|20)\d{2})[\)\]]\s*(?:-\s*)?(?P<details>.*)$")
        .expect("static regex must compile")
});

// "www.1TamilBlasters.xyz - " at the start of attachment names
static RE_SITE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^www\.\S+\s*-\s*").expect("static regex must compile"));

static RE_RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(2160p|4k|1080p|720p|576p|480p|360p)\b").expect("static regex must compile")
});

static RE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(TB|GB|MB)\b").expect("static regex must compile")
});

static RE_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tamil|malayalam|telugu|hindi|kannada|english)\b")
        .expect("static regex must compile")
});

// "[Tam + Tel]", "Multi", "Dubbed"
static RE_MULTI_AUDIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tam|tel|hin|mal|kan|eng)\b\s*\+|\bmulti\b|\bdubbed\b")
        .expect("static regex must compile")
});

static RE_SHORT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tam|tel|hin|mal|kan|eng)\b").expect("static regex must compile")
});

// Theatre captures
static RE_THEATRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:pre-?dvd|hdcam|hq-?cam|dvdscr|hd-?ts|hdtc|camrip|cam|tc)\b")
        .expect("static regex must compile")
});

/// Split a topic title into name, year and release details
pub fn parse_release_title(title: &str) -> ReleaseTitle {
    let title = title.trim();

    if let Some(caps) = RE_YEAR.captures(title) {
        return ReleaseTitle {
            name: clean_name(&caps["name"]),
            year: caps["year"].parse().ok(),
            details: caps["details"].trim().to_string(),
        };
    }

    // No year: the name runs up to the first separator
    let cut = [" - ", "["]
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());

    ReleaseTitle {
        name: clean_name(&title[..cut]),
        year: None,
        details: title[cut..].trim_start_matches([' ', '-']).trim().to_string(),
    }
}

fn clean_name(name: &str) -> String {
    name.trim().trim_end_matches(['-', ':', '|']).trim().to_string()
}

/// Attachment file name without the site prefix and `.torrent` suffix
pub fn clean_attachment_name(name: &str) -> String {
    let name = name.trim();
    let name = name
        .strip_suffix(".torrent")
        .or_else(|| name.strip_suffix(".TORRENT"))
        .unwrap_or(name);
    RE_SITE_PREFIX.replace(name, "").trim().to_string()
}

/// First resolution tag in a release name, normalized (`1080p`, `4K`)
pub fn detect_resolution(text: &str) -> Option<String> {
    RE_RESOLUTION.captures(text).map(|caps| {
        let tag = caps[1].to_lowercase();
        if tag == "4k" {
            "4K".to_string()
        } else {
            tag
        }
    })
}

/// First size mentioned in a release name, in bytes
pub fn detect_size(text: &str) -> Option<u64> {
    let caps = RE_SIZE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let unit: f64 = match caps[2].to_uppercase().as_str() {
        "TB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "GB" => 1024.0 * 1024.0 * 1024.0,
        _ => 1024.0 * 1024.0,
    };
    Some((value * unit) as u64)
}

/// Work out which catalog a release belongs to from its title alone
///
/// Used for topics found on the home page, which mixes every forum section.
pub fn classify_title(title: &str) -> Option<(Language, VideoType)> {
    let language = RE_LANGUAGE
        .captures(title)
        .or_else(|| RE_SHORT_CODE.captures(title))
        .and_then(|caps| caps[1].parse::<Language>().ok())?;

    let video_type = if RE_MULTI_AUDIO.is_match(title) {
        VideoType::Dubbed
    } else if RE_THEATRE.is_match(title) {
        VideoType::TcRip
    } else {
        VideoType::HdRip
    };

    Some((language, video_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_with_year() {
        let title = parse_release_title(
            "Leo (2023) Tamil HQ HDRip - 1080p - 720p - x264 - (DD+5.1 - 192Kbps & AAC) - 5.8GB - ESub",
        );
        assert_eq!(title.name, "Leo");
        assert_eq!(title.year, Some(2023));
        assert!(title.details.starts_with("Tamil HQ HDRip - 1080p"));

        let bracketed = parse_release_title("Mark Antony [2023] - Tamil TRUE WEB-DL - 4K");
        assert_eq!(bracketed.name, "Mark Antony");
        assert_eq!(bracketed.year, Some(2023));
        assert_eq!(bracketed.details, "Tamil TRUE WEB-DL - 4K");
    }

    #[test]
    fn test_parse_title_without_year() {
        let title = parse_release_title("Jailer - Tamil HDRip - 720p - 1.2GB");
        assert_eq!(title.name, "Jailer");
        assert_eq!(title.year, None);
        assert_eq!(title.details, "Tamil HDRip - 720p - 1.2GB");

        let bare = parse_release_title("  Vikram  ");
        assert_eq!(bare.name, "Vikram");
        assert_eq!(bare.details, "");
    }

    #[test]
    fn test_clean_attachment_name() {
        assert_eq!(
            clean_attachment_name("www.1TamilBlasters.example - Leo (2023) Tamil HDRip - 1080p - 5.8GB.torrent"),
            "Leo (2023) Tamil HDRip - 1080p - 5.8GB"
        );
        assert_eq!(clean_attachment_name("Leo.1080p.torrent"), "Leo.1080p");
    }

    #[test]
    fn test_detect_resolution_and_size() {
        assert_eq!(detect_resolution("Leo - 1080p - x264").as_deref(), Some("1080p"));
        assert_eq!(detect_resolution("Leo - 4K SDR").as_deref(), Some("4K"));
        assert_eq!(detect_resolution("Leo HDRip"), None);

        assert_eq!(detect_size("Leo - 1080p - 5.8GB - ESub"), Some((5.8 * 1024.0 * 1024.0 * 1024.0) as u64));
        assert_eq!(detect_size("Leo - 700MB"), Some(700 * 1024 * 1024));
        assert_eq!(detect_size("Leo"), None);
    }

    #[test]
    fn test_classify_title() {
        assert_eq!(
            classify_title("Leo (2023) Tamil HQ HDRip - 1080p - x264"),
            Some((Language::Tamil, VideoType::HdRip))
        );
        assert_eq!(
            classify_title("Kannur Squad (2023) Malayalam HQ PreDVD - 720p"),
            Some((Language::Malayalam, VideoType::TcRip))
        );
        assert_eq!(
            classify_title("Jawan (2023) Hindi HQ HDCAM - x264 - 1.2GB"),
            Some((Language::Hindi, VideoType::TcRip))
        );
        assert_eq!(
            classify_title("Oppenheimer (2023) TRUE WEB-DL - 1080p - [Tam + Tel + Hin + Eng]"),
            Some((Language::Tamil, VideoType::Dubbed))
        );
        assert_eq!(
            classify_title("Fast X (2023) English HDRip - Tamil Dubbed"),
            Some((Language::English, VideoType::Dubbed))
        );
        assert_eq!(classify_title("Site rules and announcements"), None);
    }
}
