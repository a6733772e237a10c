use crate::models::Property;
use crate::search::error::{SearchError, SearchResult};
use crate::search::types::{RankSpec, SortKey};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

impl SortKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::ValuationDesc => "valuation_desc",
            SortKey::ViewsDesc => "views_desc",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortKey::Newest),
            "price_asc" => Some(SortKey::PriceAsc),
            "price_desc" => Some(SortKey::PriceDesc),
            "valuation_desc" => Some(SortKey::ValuationDesc),
            "views_desc" => Some(SortKey::ViewsDesc),
            _ => None,
        }
    }
}

/// Map a signed value to unsigned bits whose natural ordering matches the
/// signed ordering.
fn asc_bits(v: i64) -> u64 {
    (v as u64) ^ (1 << 63)
}

/// Position of a property in the total order defined by a [`RankSpec`].
/// Lexicographic comparison of the fields is the order itself: featured
/// rank, then the sort-key bits (already direction-adjusted), then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    pub featured: u8,
    pub key_bits: u64,
    pub id: String,
}

impl RankKey {
    pub fn of(p: &Property, spec: &RankSpec) -> Self {
        let featured = if spec.featured_first && p.featured { 0 } else { 1 };
        let key_bits = match spec.key {
            SortKey::Newest => !asc_bits(p.created_at.timestamp_micros()),
            SortKey::PriceAsc => asc_bits(p.price),
            SortKey::PriceDesc => !asc_bits(p.price),
            // Valuations are validated non-negative, so the inverted bits
            // never reach u64::MAX; absent valuations sort last.
            SortKey::ValuationDesc => match p.ai_valuation {
                Some(v) => !asc_bits(v),
                None => u64::MAX,
            },
            SortKey::ViewsDesc => !p.views,
        };
        Self {
            featured,
            key_bits,
            id: p.id.clone(),
        }
    }
}

/// Decoded pagination cursor: the rank key of the last item served, plus
/// the rank spec it was computed under so a cursor from a differently
/// ordered search is rejected instead of misinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub spec: RankSpec,
    pub last: RankKey,
}

impl Cursor {
    /// Encode as an opaque base64url token.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{},{},{},{:016x},{}",
            self.spec.key.as_str(),
            u8::from(self.spec.featured_first),
            self.last.featured,
            self.last.key_bits,
            self.last.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Decode a caller-supplied token. Any malformed or foreign token is
    /// an [`SearchError::InvalidCursor`].
    pub fn decode(token: &str) -> SearchResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| SearchError::InvalidCursor)?;
        let raw = String::from_utf8(bytes).map_err(|_| SearchError::InvalidCursor)?;
        let mut parts = raw.splitn(5, ',');
        let key = parts
            .next()
            .and_then(SortKey::parse)
            .ok_or(SearchError::InvalidCursor)?;
        let featured_first = match parts.next() {
            Some("0") => false,
            Some("1") => true,
            _ => return Err(SearchError::InvalidCursor),
        };
        let featured = parts
            .next()
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|f| *f <= 1)
            .ok_or(SearchError::InvalidCursor)?;
        let key_bits = parts
            .next()
            .and_then(|s| u64::from_str_radix(s, 16).ok())
            .ok_or(SearchError::InvalidCursor)?;
        let id = parts.next().ok_or(SearchError::InvalidCursor)?;
        if id.is_empty() {
            return Err(SearchError::InvalidCursor);
        }
        Ok(Self {
            spec: RankSpec {
                featured_first,
                key,
            },
            last: RankKey {
                featured,
                key_bits,
                id: id.to_string(),
            },
        })
    }
}

/// A ranked, sliced page of raw properties, before relation hydration
#[derive(Debug)]
pub struct RankedPage {
    pub items: Vec<Property>,
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

/// Validate a requested page size against the configured maximum.
pub fn validate_page_size(size: usize, max: usize) -> SearchResult<usize> {
    if size == 0 || size > max {
        return Err(SearchError::InvalidPageSize { given: size, max });
    }
    Ok(size)
}

/// Order matches by the rank spec and slice out the page after `cursor`.
///
/// `has_more` comes from taking one element beyond the page size and
/// checking it exists; there is no separate count query to race against.
pub fn rank_and_page(
    matches: Vec<Property>,
    spec: &RankSpec,
    cursor: Option<&Cursor>,
    page_size: usize,
) -> SearchResult<RankedPage> {
    debug_assert!(page_size >= 1);

    let mut keyed: Vec<(RankKey, Property)> = matches
        .into_iter()
        .map(|p| (RankKey::of(&p, spec), p))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let after = cursor.map(|c| &c.last);
    let mut page: Vec<(RankKey, Property)> = keyed
        .into_iter()
        .filter(|(key, _)| after.map_or(true, |last| key > last))
        .take(page_size + 1)
        .collect();

    let has_more = page.len() > page_size;
    page.truncate(page_size);

    let next_cursor = if has_more {
        page.last().map(|(key, _)| Cursor {
            spec: *spec,
            last: key.clone(),
        })
    } else {
        None
    };

    Ok(RankedPage {
        items: page.into_iter().map(|(_, p)| p).collect(),
        next_cursor,
        has_more,
    })
}
