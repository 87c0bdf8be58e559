// 🏷️ Source Tags - Provenance labels as data
// One row per tag: wire name, merge rank, core-filter class

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rank assigned to tags that have no place in the priority table
pub const UNRANKED: u16 = 999;

// ============================================================================
// SOURCE CLASS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceClass {
    /// Generic curated seed list
    Curated,

    /// Curated classics, always part of the core dataset
    Classic,

    /// Curated thematic lists, part of core regardless of year
    Thematic,

    /// Bechdel Test API
    PrimaryApi,

    /// Bechdel Test RSS feed
    Feed,

    /// IMDb list export
    ListImport,

    /// Tag not found in the table
    Unrecognized,
}

// ============================================================================
// TAG TABLE
// ============================================================================

macro_rules! source_tags {
    ($($variant:ident => $tag:literal, $rank:expr, $class:ident;)+) => {
        /// Source tags the pipeline knows how to rank
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownSource {
            $($variant,)+
        }

        impl KnownSource {
            pub const ALL: &'static [KnownSource] = &[$(KnownSource::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(KnownSource::$variant => $tag,)+
                }
            }

            /// Merge priority (lower wins)
            pub fn rank(self) -> u16 {
                match self {
                    $(KnownSource::$variant => $rank,)+
                }
            }

            pub fn class(self) -> SourceClass {
                match self {
                    $(KnownSource::$variant => SourceClass::$class,)+
                }
            }

            pub fn from_tag(tag: &str) -> Option<KnownSource> {
                match tag {
                    $($tag => Some(KnownSource::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

source_tags! {
    Seed => "seed", 0, Curated;
    Oscars => "oscars", 0, Classic;
    AfiClassics => "afi-classics", 0, Classic;
    Popular => "popular", 0, Classic;
    Environmental => "environmental", 0, Thematic;
    SocialJustice => "social-justice", 0, Thematic;
    International => "international", 0, Thematic;
    Modern => "modern", 0, Thematic;
    Recent => "recent", 0, Thematic;
    Lgbtq => "lgbtq", 0, Thematic;
    Documentary => "documentary", 0, Thematic;
    SciFi => "sci-fi", 0, Thematic;
    Animation => "animation", 0, Thematic;
    Fantasy => "fantasy", 0, Thematic;
    DiverseDirectors => "diverse-directors", 0, Thematic;
    Bechdel => "bechdel", 1, PrimaryApi;
    BechdelRss => "bechdel-rss", 2, Feed;
    ImdbList => "imdb-list", UNRANKED, ListImport;
}

// ============================================================================
// SOURCE TAG
// ============================================================================

/// Provenance label carried by every FilmRecord.
///
/// Unknown tags are kept verbatim so they survive a round trip through the
/// dataset files; they rank last and never qualify for the core dataset on
/// their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceTag {
    Known(KnownSource),
    Unrecognized(String),
}

impl SourceTag {
    pub fn parse(tag: &str) -> Self {
        match KnownSource::from_tag(tag) {
            Some(known) => SourceTag::Known(known),
            None => SourceTag::Unrecognized(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceTag::Known(known) => known.as_str(),
            SourceTag::Unrecognized(tag) => tag,
        }
    }

    pub fn rank(&self) -> u16 {
        match self {
            SourceTag::Known(known) => known.rank(),
            SourceTag::Unrecognized(_) => UNRANKED,
        }
    }

    pub fn class(&self) -> SourceClass {
        match self {
            SourceTag::Known(known) => known.class(),
            SourceTag::Unrecognized(_) => SourceClass::Unrecognized,
        }
    }
}

impl From<KnownSource> for SourceTag {
    fn from(known: KnownSource) -> Self {
        SourceTag::Known(known)
    }
}

impl From<String> for SourceTag {
    fn from(tag: String) -> Self {
        match KnownSource::from_tag(&tag) {
            Some(known) => SourceTag::Known(known),
            None => SourceTag::Unrecognized(tag),
        }
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        match tag {
            SourceTag::Known(known) => known.as_str().to_string(),
            SourceTag::Unrecognized(tag) => tag,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
