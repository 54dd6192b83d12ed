use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::{BookingError, BookingResult, EntityKind};

const SHORT_TEXT: usize = 120;
const LONG_TEXT: usize = 500;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().\-]+$").expect("phone pattern is valid"));

/// Submitted venue fields, already type-converted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    /// Genre descriptions, resolved against the lookup table on write.
    pub genres: Vec<String>,
}

/// Submitted artist fields, already type-converted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

impl VenueForm {
    /// Trim and check every field. Empty optional fields become `None`.
    pub fn validate(self) -> BookingResult<Self> {
        let entity = EntityKind::Venue;
        Ok(Self {
            name: required(entity, "name", self.name, None)?,
            city: required(entity, "city", self.city, Some(SHORT_TEXT))?,
            state: required(entity, "state", self.state, Some(SHORT_TEXT))?,
            address: required(entity, "address", self.address, Some(SHORT_TEXT))?,
            phone: phone(entity, self.phone)?,
            image_link: link(entity, "image_link", self.image_link, LONG_TEXT)?,
            website_link: link(entity, "website_link", self.website_link, SHORT_TEXT)?,
            facebook_link: link(entity, "facebook_link", self.facebook_link, SHORT_TEXT)?,
            seeking_talent: self.seeking_talent,
            seeking_description: optional(
                entity,
                "seeking_description",
                self.seeking_description,
                LONG_TEXT,
            )?,
            genres: genres(entity, self.genres)?,
        })
    }
}

impl ArtistForm {
    /// Trim and check every field. Empty optional fields become `None`.
    pub fn validate(self) -> BookingResult<Self> {
        let entity = EntityKind::Artist;
        Ok(Self {
            name: required(entity, "name", self.name, None)?,
            city: required(entity, "city", self.city, Some(SHORT_TEXT))?,
            state: required(entity, "state", self.state, Some(SHORT_TEXT))?,
            phone: phone(entity, self.phone)?,
            image_link: link(entity, "image_link", self.image_link, LONG_TEXT)?,
            website_link: link(entity, "website_link", self.website_link, SHORT_TEXT)?,
            facebook_link: link(entity, "facebook_link", self.facebook_link, SHORT_TEXT)?,
            seeking_venue: self.seeking_venue,
            seeking_description: optional(
                entity,
                "seeking_description",
                self.seeking_description,
                LONG_TEXT,
            )?,
            genres: genres(entity, self.genres)?,
        })
    }
}

fn check_length(
    entity: EntityKind,
    field: &'static str,
    value: &str,
    max: usize,
) -> BookingResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(BookingError::validation(
            entity,
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

pub(crate) fn required(
    entity: EntityKind,
    field: &'static str,
    value: String,
    max: Option<usize>,
) -> BookingResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(entity, field, "is required"));
    }
    if let Some(max) = max {
        check_length(entity, field, trimmed, max)?;
    }
    Ok(trimmed.to_string())
}

fn optional(
    entity: EntityKind,
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> BookingResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    check_length(entity, field, trimmed, max)?;
    Ok(Some(trimmed.to_string()))
}

fn link(
    entity: EntityKind,
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> BookingResult<Option<String>> {
    let Some(value) = optional(entity, field, value, max)? else {
        return Ok(None);
    };
    let url = Url::parse(&value)
        .map_err(|e| BookingError::validation(entity, field, format!("invalid URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(BookingError::validation(
            entity,
            field,
            format!("unsupported URL scheme `{}`", url.scheme()),
        ));
    }
    Ok(Some(value))
}

fn phone(entity: EntityKind, value: Option<String>) -> BookingResult<Option<String>> {
    let Some(value) = optional(entity, "phone", value, SHORT_TEXT)? else {
        return Ok(None);
    };
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !PHONE_PATTERN.is_match(&value) || !(7..=15).contains(&digits) {
        return Err(BookingError::validation(
            entity,
            "phone",
            format!("`{value}` is not a phone number"),
        ));
    }
    Ok(Some(value))
}

fn genres(entity: EntityKind, names: Vec<String>) -> BookingResult<Vec<String>> {
    names
        .into_iter()
        .map(|name| required(entity, "genres", name, Some(SHORT_TEXT)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue() -> VenueForm {
        VenueForm {
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("123-123-1234".into()),
            website_link: Some("https://www.themusicalhop.com".into()),
            genres: vec!["Jazz".into()],
            ..Default::default()
        }
    }

    fn field_of(err: BookingError) -> &'static str {
        match err {
            BookingError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_venue_is_trimmed() {
        let mut form = venue();
        form.name = "  The Musical Hop ".into();
        form.seeking_description = Some("   ".into());
        let valid = form.validate().unwrap();
        assert_eq!(valid.name, "The Musical Hop");
        assert_eq!(valid.seeking_description, None);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut form = venue();
        form.city = "".into();
        assert_eq!(field_of(form.validate().unwrap_err()), "city");

        let mut form = venue();
        form.address = " ".into();
        assert_eq!(field_of(form.validate().unwrap_err()), "address");

        let artist = ArtistForm {
            name: "".into(),
            city: "New York".into(),
            state: "NY".into(),
            ..Default::default()
        };
        assert_eq!(field_of(artist.validate().unwrap_err()), "name");
    }

    #[test]
    fn test_malformed_links() {
        let mut form = venue();
        form.facebook_link = Some("facebook.com/hop".into());
        assert_eq!(field_of(form.validate().unwrap_err()), "facebook_link");

        let mut form = venue();
        form.image_link = Some("ftp://images.example.com/a.png".into());
        assert_eq!(field_of(form.validate().unwrap_err()), "image_link");
    }

    #[test]
    fn test_phone_numbers() {
        for ok in ["326-123-5000", "(415) 000-1234", "+1 415 000 1234"] {
            let mut form = venue();
            form.phone = Some(ok.into());
            assert!(form.validate().is_ok(), "{ok} should be accepted");
        }
        for bad in ["call us", "12-34", "555-CALL-NOW"] {
            let mut form = venue();
            form.phone = Some(bad.into());
            assert_eq!(field_of(form.validate().unwrap_err()), "phone");
        }
    }

    #[test]
    fn test_field_length_limits() {
        let mut form = venue();
        form.state = "C".repeat(121);
        assert_eq!(field_of(form.validate().unwrap_err()), "state");

        let mut form = venue();
        form.seeking_description = Some("x".repeat(500));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_blank_genre_rejected() {
        let mut form = venue();
        form.genres = vec!["Jazz".into(), " ".into()];
        assert_eq!(field_of(form.validate().unwrap_err()), "genres");
    }
}
