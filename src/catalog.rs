//! Rover photo catalog queries.
//!
//! Builds request URLs for the remote photo catalog and parses its JSON
//! listing. The HTTP round trip itself belongs to the host application.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::ImageRequest;

/// Catalog endpoint; the rover name is appended as a path segment.
pub const CATALOG_BASE_URL: &str = "https://api.nasa.gov/mars-photos/api/v1/rovers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Rover {
    #[default]
    Curiosity,
    Opportunity,
    Spirit,
    Perseverance,
}

impl Rover {
    pub const ALL: [Rover; 4] = [
        Rover::Curiosity,
        Rover::Opportunity,
        Rover::Spirit,
        Rover::Perseverance,
    ];

    /// Display name, e.g. `Curiosity`.
    pub fn name(self) -> &'static str {
        match self {
            Rover::Curiosity => "Curiosity",
            Rover::Opportunity => "Opportunity",
            Rover::Spirit => "Spirit",
            Rover::Perseverance => "Perseverance",
        }
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rover camera filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Camera {
    Fhaz,
    Rhaz,
    Mast,
    Chemcam,
    Navcam,
}

impl Camera {
    pub const ALL: [Camera; 5] = [
        Camera::Fhaz,
        Camera::Rhaz,
        Camera::Mast,
        Camera::Chemcam,
        Camera::Navcam,
    ];

    /// Query-string code, e.g. `FHAZ`.
    pub fn code(self) -> &'static str {
        match self {
            Camera::Fhaz => "FHAZ",
            Camera::Rhaz => "RHAZ",
            Camera::Mast => "MAST",
            Camera::Chemcam => "CHEMCAM",
            Camera::Navcam => "NAVCAM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Camera::Fhaz => "Front Hazard",
            Camera::Rhaz => "Rear Hazard",
            Camera::Mast => "Mast Camera",
            Camera::Chemcam => "ChemCam",
            Camera::Navcam => "Navigation",
        }
    }
}

/// One catalog listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub rover: Rover,
    /// Martian day since landing.
    pub sol: u32,
    /// `None` lists every camera.
    pub camera: Option<Camera>,
    pub api_key: String,
}

impl CatalogQuery {
    pub const DEFAULT_SOL: u32 = 1000;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            rover: Rover::default(),
            sol: Self::DEFAULT_SOL,
            camera: None,
            api_key: api_key.into(),
        }
    }

    /// Listing URL with query string.
    pub fn url(&self) -> String {
        let mut url = format!(
            "{CATALOG_BASE_URL}/{}/photos?sol={}&api_key={}",
            self.rover.name().to_lowercase(),
            self.sol,
            self.api_key
        );
        if let Some(camera) = self.camera {
            url.push_str("&camera=");
            url.push_str(camera.code());
        }
        url
    }
}

/// One entry of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPhoto {
    pub id: u64,
    pub img_src: String,
}

impl CatalogPhoto {
    /// Direct-transport request for this photo's pixels.
    pub fn request(&self) -> ImageRequest {
        ImageRequest::direct(self.img_src.clone())
    }
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    photos: Vec<CatalogPhoto>,
}

/// Parse a catalog listing body. A body without `photos` is an empty listing.
pub fn parse_photos(json: &str) -> serde_json::Result<Vec<CatalogPhoto>> {
    let listing: Listing = serde_json::from_str(json)?;
    Ok(listing.photos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url() {
        let mut query = CatalogQuery::new("KEY");
        assert_eq!(
            query.url(),
            "https://api.nasa.gov/mars-photos/api/v1/rovers/curiosity/photos?sol=1000&api_key=KEY"
        );

        query.rover = Rover::Perseverance;
        query.sol = 12;
        query.camera = Some(Camera::Navcam);
        assert_eq!(
            query.url(),
            format!("{CATALOG_BASE_URL}/perseverance/photos?sol=12&api_key=KEY&camera=NAVCAM")
        );
    }

    #[test]
    fn test_parse_photos() {
        let body = r#"{"photos": [
            {"id": 102693, "img_src": "http://mars.jpl.nasa.gov/a.JPG", "sol": 1000},
            {"id": 102694, "img_src": "http://mars.jpl.nasa.gov/b.JPG"}
        ]}"#;
        let photos = parse_photos(body).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id, 102693);
        assert_eq!(photos[1].request().url, "http://mars.jpl.nasa.gov/b.JPG");

        assert!(parse_photos("{}").unwrap().is_empty());
        assert!(parse_photos("not json").is_err());
    }

    #[test]
    fn test_camera_codes() {
        for camera in Camera::ALL {
            let json = serde_json::to_string(&camera).unwrap();
            assert_eq!(json, format!("\"{}\"", camera.code()));
        }
        assert_eq!(Camera::Mast.label(), "Mast Camera");
        assert_eq!(Rover::ALL.len(), 4);
    }
}
