// Shelfmark
// Copyright 2025 The Shelfmark Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The `Book` data type and the helpers to query the catalog.

use crate::model::BookId;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::Serialize;
use shelfmark_core::model::{ModelError, ModelResult};
use time::{Date, Month, OffsetDateTime};
use url::Url;

/// File extensions accepted in cover image URLs.
const COVER_EXTENSIONS: &[&str] = &[".gif", ".jpeg", ".jpg", ".png", ".webp"];

/// An International Standard Book Number in normalized form.
///
/// Normalization strips separators so that equivalent ISBNs compare equal, which is what
/// backs the uniqueness checks in the catalog.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, Eq, PartialEq))]
#[serde(transparent)]
pub(crate) struct Isbn(String);

impl Isbn {
    /// Creates a new ISBN from an untrusted string `raw`, making sure it is valid.
    ///
    /// Hyphens and spaces are stripped before validation, and the remainder must be exactly
    /// 10 or 13 digits.
    pub(crate) fn new<S: AsRef<str>>(raw: S) -> ModelResult<Self> {
        let digits: String =
            raw.as_ref().chars().filter(|ch| *ch != '-' && *ch != ' ').collect();
        if !(digits.len() == 10 || digits.len() == 13)
            || !digits.chars().all(|ch| ch.is_ascii_digit())
        {
            return Err(ModelError(format!(
                "ISBN {} must contain exactly 10 or 13 digits",
                raw.as_ref()
            )));
        }
        Ok(Self(digits))
    }

    /// Returns a string view of the normalized ISBN.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated fields to create a book or to replace the contents of an existing one.
#[derive(Getters)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub(crate) struct BookDetails {
    /// Title of the book.
    title: String,

    /// Author of the book.
    author: String,

    /// Free-form description of the book, if any.
    description: Option<String>,

    /// Normalized ISBN of the book, if any.
    isbn: Option<Isbn>,

    /// Genre the book belongs to, if any.
    genre: Option<String>,

    /// Date at which the book was published, if known.
    published_date: Option<Date>,

    /// URL of the cover image, if any.
    cover_url: Option<String>,
}

impl BookDetails {
    /// Creates the validated details from the untrusted fields of a mutation request.
    ///
    /// Optional fields that come in as blank strings are treated as absent.
    pub(crate) fn new(
        title: &str,
        author: &str,
        description: Option<&str>,
        isbn: Option<&str>,
        genre: Option<&str>,
        published_date: Option<&str>,
        cover_url: Option<&str>,
    ) -> ModelResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ModelError("Title cannot be empty".to_owned()));
        }

        let author = author.trim();
        if author.is_empty() {
            return Err(ModelError("Author cannot be empty".to_owned()));
        }

        let isbn = match non_blank(isbn) {
            Some(raw) => Some(Isbn::new(raw)?),
            None => None,
        };

        let published_date = match non_blank(published_date) {
            Some(raw) => Some(parse_date(raw)?),
            None => None,
        };

        let cover_url = match non_blank(cover_url) {
            Some(raw) => Some(validate_cover_url(raw)?),
            None => None,
        };

        Ok(Self {
            title: title.to_owned(),
            author: author.to_owned(),
            description: non_blank(description).map(String::from),
            isbn,
            genre: non_blank(genre).map(String::from),
            published_date,
            cover_url,
        })
    }
}

/// Discards blank optional inputs and trims the rest.
fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a published date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(raw: &str) -> ModelResult<Date> {
    let error = || ModelError(format!("Invalid date {}: must be YYYY-MM-DD", raw));

    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return Err(error());
    }
    let year = parts[0].parse::<i32>().map_err(|_| error())?;
    let month = parts[1].parse::<u8>().map_err(|_| error())?;
    let month = Month::try_from(month).map_err(|_| error())?;
    let day = parts[2].parse::<u8>().map_err(|_| error())?;
    Date::from_calendar_date(year, month, day).map_err(|_| error())
}

/// Formats a published date in `YYYY-MM-DD` form.
pub(crate) fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Checks that a cover URL is well-formed and points to an image file.
fn validate_cover_url(raw: &str) -> ModelResult<String> {
    let url = Url::parse(raw).map_err(|e| ModelError(format!("Invalid cover URL {}: {}", raw, e)))?;
    let path = url.path().to_lowercase();
    if !COVER_EXTENSIONS.iter().any(|extension| path.ends_with(extension)) {
        return Err(ModelError(format!("Cover URL {} does not point to an image file", raw)));
    }
    Ok(raw.to_owned())
}

/// Serializes an optional published date as `YYYY-MM-DD`.
fn serialize_published_date<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(date) => serializer.serialize_some(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}

/// Deserializes an optional published date from its `YYYY-MM-DD` form.
#[cfg(test)]
fn deserialize_published_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Representation of a book in the catalog together with its review aggregates.
///
/// `average_rating` and `review_count` are derived from the stored reviews at query time.
/// A book with no reviews reports zero for both.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Book {
    /// Identifier of the book.
    id: BookId,

    /// Title of the book.
    title: String,

    /// Author of the book.
    author: String,

    /// Free-form description of the book, if any.
    description: Option<String>,

    /// Normalized ISBN of the book, if any.
    isbn: Option<Isbn>,

    /// Genre the book belongs to, if any.
    genre: Option<String>,

    /// Date at which the book was published, if known.
    #[serde(serialize_with = "serialize_published_date")]
    #[cfg_attr(test, serde(deserialize_with = "deserialize_published_date"))]
    published_date: Option<Date>,

    /// URL of the cover image, if any.
    cover_url: Option<String>,

    /// Mean of the review ratings, rounded to two decimals.
    average_rating: f64,

    /// Number of reviews on record for the book.
    review_count: i64,

    /// Time at which the book was added to the catalog.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the book was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Book {
    /// Builds the representation of a freshly-created book, which cannot have reviews yet.
    pub(crate) fn with_details(id: BookId, details: &BookDetails, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: details.title().clone(),
            author: details.author().clone(),
            description: details.description().clone(),
            isbn: details.isbn().clone(),
            genre: details.genre().clone(),
            published_date: *details.published_date(),
            cover_url: details.cover_url().clone(),
            average_rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filters to narrow down catalog listings and searches.
///
/// One value feeds both the page query and the total count query so that the two cannot
/// disagree on which books are in scope.
#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub(crate) struct BookFilters {
    /// Case-insensitive text to look for in the title, author, ISBN and description.
    search: Option<String>,

    /// Exact genre to restrict the listing to.
    genre: Option<String>,

    /// Case-insensitive author fragment to restrict the listing to.
    author: Option<String>,

    /// Lower bound on the average rating, inclusive.
    min_rating: Option<f64>,

    /// Upper bound on the average rating, inclusive.
    max_rating: Option<f64>,
}

impl BookFilters {
    /// Sets the free-text search term.
    pub(crate) fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the exact genre to filter by.
    pub(crate) fn with_genre<S: Into<String>>(mut self, genre: S) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the author fragment to filter by.
    pub(crate) fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the inclusive lower bound on the average rating.
    pub(crate) fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    /// Sets the inclusive upper bound on the average rating.
    pub(crate) fn with_max_rating(mut self, max_rating: f64) -> Self {
        self.max_rating = Some(max_rating);
        self
    }

    /// Checks whether no filter at all is active.
    pub(crate) fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.genre.is_none()
            && self.author.is_none()
            && self.min_rating.is_none()
            && self.max_rating.is_none()
    }

    pub(crate) fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub(crate) fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub(crate) fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub(crate) fn min_rating(&self) -> Option<f64> {
        self.min_rating
    }

    pub(crate) fn max_rating(&self) -> Option<f64> {
        self.max_rating
    }
}

/// Validates a rating bound supplied as a query parameter named `name`.
pub(crate) fn parse_rating_bound(name: &str, raw: &str) -> ModelResult<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..=5.0).contains(&value) => Ok(value),
        _ => Err(ModelError(format!("{} must be a number between 0 and 5", name))),
    }
}

/// Keys on which catalog listings can be sorted.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) enum BookSortKey {
    Author,
    AverageRating,
    CreatedAt,
    PublishedDate,
    ReviewCount,
    Title,
}

/// Direction of a sort.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) enum SortOrder {
    Asc,
    Desc,
}

/// Combined sort selection for catalog listings.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) struct BookSort {
    key: BookSortKey,
    order: SortOrder,
}

impl BookSort {
    /// Interprets the raw `sortBy` and `sortOrder` query parameters.
    ///
    /// Unrecognized keys and orders fall back to creation time, newest first, so that a typo
    /// in a query cannot turn into an error after the listing was already filtered.
    pub(crate) fn from_query(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let key = match sort_by {
            Some("author") => BookSortKey::Author,
            Some("average_rating") => BookSortKey::AverageRating,
            Some("created_at") => BookSortKey::CreatedAt,
            Some("published_date") => BookSortKey::PublishedDate,
            Some("review_count") => BookSortKey::ReviewCount,
            Some("title") => BookSortKey::Title,
            _ => BookSortKey::CreatedAt,
        };

        let order = match sort_order.map(str::to_lowercase).as_deref() {
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Desc,
        };

        Self { key, order }
    }

    pub(crate) fn key(&self) -> BookSortKey {
        self.key
    }

    pub(crate) fn order(&self) -> SortOrder {
        self.order
    }
}

impl Default for BookSort {
    fn default() -> Self {
        BookSort::from_query(None, None)
    }
}
