//! Location Resolution Module
//!
//! Turns a raw location query into a single candidate, or into the list of
//! candidates the caller has to choose from.

use crate::api::WeatherProvider;
use crate::models::Candidate;
use crate::query::{LocationInput, LocationParser};
use crate::{Result, WeatherError};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of resolving a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Resolution {
    /// Exactly one location applies
    Selected(Candidate),
    /// Several candidates matched; none was chosen
    Ambiguous(Vec<Candidate>),
}

impl Resolution {
    /// The selected candidate, or `LocationAmbiguous` carrying the choices
    pub fn into_selected(self, query: &str) -> Result<Candidate> {
        match self {
            Resolution::Selected(candidate) => Ok(candidate),
            Resolution::Ambiguous(candidates) => Err(WeatherError::LocationAmbiguous {
                query: query.to_string(),
                candidates,
            }),
        }
    }

    /// Pick a candidate by its 1-based position in the list
    pub fn select(self, position: usize) -> Result<Candidate> {
        let mut candidates = match self {
            Resolution::Selected(candidate) => vec![candidate],
            Resolution::Ambiguous(candidates) => candidates,
        };
        if position == 0 || position > candidates.len() {
            return Err(WeatherError::validation(format!(
                "Selection {position} is out of range (1-{})",
                candidates.len()
            )));
        }
        Ok(candidates.swap_remove(position - 1))
    }
}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a query. Coordinates bypass the provider search.
    ///
    /// With `auto_select_first` the provider's top-ranked result is taken
    /// instead of returning [`Resolution::Ambiguous`].
    pub async fn resolve<P>(provider: &P, query: &str, auto_select_first: bool) -> Result<Resolution>
    where
        P: WeatherProvider + ?Sized,
    {
        let location_input = LocationParser::parse(query)?;
        debug!("Resolving location input: {:?}", location_input);

        let term = match location_input {
            LocationInput::Coordinates(lat, lon) => {
                debug!("Using coordinates directly: ({}, {})", lat, lon);
                return Ok(Resolution::Selected(Candidate::from_coordinates(lat, lon)));
            }
            LocationInput::Name(name) => name,
            LocationInput::PostalCode(postal) => postal,
        };

        let mut candidates = provider.search(&term).await?;
        match candidates.len() {
            0 => Err(WeatherError::not_found(query.trim())),
            1 => {
                let candidate = candidates.remove(0);
                info!(
                    "Resolved '{}' to {} ({:.4}, {:.4})",
                    term,
                    candidate.display_name(),
                    candidate.latitude,
                    candidate.longitude
                );
                Ok(Resolution::Selected(candidate))
            }
            count if auto_select_first => {
                let candidate = candidates.remove(0);
                info!(
                    "Auto-selected {} out of {} candidates for '{}'",
                    candidate.display_name(),
                    count,
                    term
                );
                Ok(Resolution::Selected(candidate))
            }
            count => {
                debug!("'{}' is ambiguous: {} candidates", term, count);
                Ok(Resolution::Ambiguous(candidates))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{FakeProvider, london_ontario, london_uk};

    #[tokio::test]
    async fn single_match_is_selected() {
        let provider = FakeProvider::default().with_results("paris", vec![london_uk()]);
        let resolution = LocationResolver::resolve(&provider, "Paris", false).await.unwrap();
        assert_eq!(resolution, Resolution::Selected(london_uk()));
    }

    #[tokio::test]
    async fn london_returns_both_candidates() {
        let provider =
            FakeProvider::default().with_results("london", vec![london_uk(), london_ontario()]);

        let resolution = LocationResolver::resolve(&provider, "London", false).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Ambiguous(vec![london_uk(), london_ontario()])
        );

        let err = resolution.into_selected("London").unwrap_err();
        assert!(
            matches!(err, WeatherError::LocationAmbiguous { ref candidates, .. } if candidates.len() == 2)
        );
    }

    #[tokio::test]
    async fn auto_select_takes_first_ranked() {
        let provider =
            FakeProvider::default().with_results("london", vec![london_ontario(), london_uk()]);
        let resolution = LocationResolver::resolve(&provider, "London", true).await.unwrap();
        assert_eq!(resolution, Resolution::Selected(london_ontario()));
    }

    #[tokio::test]
    async fn coordinates_bypass_search() {
        let provider = FakeProvider::default();
        let resolution = LocationResolver::resolve(&provider, "51.5074,-0.1278", false)
            .await
            .unwrap();

        let Resolution::Selected(candidate) = resolution else {
            panic!("expected a selected candidate");
        };
        assert_eq!(candidate.latitude, 51.5074);
        assert_eq!(candidate.longitude, -0.1278);
        assert_eq!(provider.search_count(), 0);
    }

    #[tokio::test]
    async fn no_match_and_empty_query() {
        let provider = FakeProvider::default();
        assert!(matches!(
            LocationResolver::resolve(&provider, "Atlantis", false).await,
            Err(WeatherError::LocationNotFound { query }) if query == "Atlantis"
        ));
        assert!(matches!(
            LocationResolver::resolve(&provider, "  ", false).await,
            Err(WeatherError::QueryEmpty)
        ));
    }

    #[tokio::test]
    async fn abbreviations_are_expanded_before_search() {
        let provider =
            FakeProvider::default().with_results("london, united kingdom", vec![london_uk()]);
        let resolution = LocationResolver::resolve(&provider, "London, UK", false)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::Selected(london_uk()));
    }

    #[test]
    fn select_by_position() {
        let resolution = Resolution::Ambiguous(vec![london_uk(), london_ontario()]);
        assert_eq!(resolution.clone().select(2).unwrap(), london_ontario());
        assert!(resolution.clone().select(0).is_err());
        assert!(resolution.select(3).is_err());
    }
}
