//! Results panel view model.

use std::fmt;

use super::types::{DetectionResult, OwnerInfo, PlateMatch, VehicleInfo};

/// Shown when a successful detection found nothing.
pub const NO_PLATES_MESSAGE: &str = "No license plates detected";

/// What the results panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Server reported `success: false`.
    Failure(String),
    /// Success with an empty plate list.
    Empty,
    /// One card per plate, in server order.
    Plates { source: String, cards: Vec<PlateCard> },
}

/// One plate in the results list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateCard {
    pub text: String,
    /// e.g. `Confidence: 85%`
    pub confidence: String,
    pub vehicle: Option<VehicleCard>,
}

/// Vehicle block of a plate card.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCard {
    /// Year, make, model and colour, skipping missing parts.
    pub description: String,
    pub status: Option<String>,
    pub owner: OwnerCard,
}

/// Owner block of a plate card. Absent optional fields are not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerCard {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `City, ST`, only when both parts are known.
    pub location: Option<String>,
}

impl ResultsView {
    /// Build the view for a detection response.
    #[must_use]
    pub fn from_result(result: &DetectionResult) -> Self {
        if !result.success {
            return Self::Failure(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "Detection failed".to_string()),
            );
        }
        if result.plates.is_empty() {
            return Self::Empty;
        }
        Self::Plates {
            source: result.source.clone().unwrap_or_default(),
            cards: result.plates.iter().map(PlateCard::from_plate).collect(),
        }
    }
}

impl PlateCard {
    fn from_plate(plate: &PlateMatch) -> Self {
        Self {
            text: plate.text.clone(),
            confidence: format!("Confidence: {}%", plate.confidence),
            vehicle: plate.vehicle_info.as_ref().map(VehicleCard::from_info),
        }
    }
}

impl VehicleCard {
    fn from_info(info: &VehicleInfo) -> Self {
        let year = info.year.map(|y| y.to_string());
        let description = [
            year.as_deref(),
            info.make.as_deref(),
            info.model.as_deref(),
            info.color.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Self {
            description,
            status: info.status.clone(),
            owner: OwnerCard::from_owner(&info.owner),
        }
    }
}

impl OwnerCard {
    fn from_owner(owner: &OwnerInfo) -> Self {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let location = match (present(&owner.city), present(&owner.state)) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            _ => None,
        };
        Self {
            name: owner.name.clone(),
            email: present(&owner.email),
            phone: present(&owner.phone),
            location,
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(message) => write!(f, "Error: {message}"),
            Self::Empty => f.write_str(NO_PLATES_MESSAGE),
            Self::Plates { source, cards } => {
                write!(f, "Source: {source}")?;
                for card in cards {
                    write!(f, "\n\n{card}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PlateCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.text, self.confidence)?;
        let Some(vehicle) = &self.vehicle else {
            return Ok(());
        };
        write!(f, "\n  Vehicle: {}", vehicle.description)?;
        if let Some(status) = &vehicle.status {
            write!(f, " [{status}]")?;
        }
        let owner = &vehicle.owner;
        write!(f, "\n  Owner: {}", owner.name)?;
        if let Some(email) = &owner.email {
            write!(f, "\n  Email: {email}")?;
        }
        if let Some(phone) = &owner.phone {
            write!(f, "\n  Phone: {phone}")?;
        }
        if let Some(location) = &owner.location {
            write!(f, "\n  Location: {location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn result(value: serde_json::Value) -> DetectionResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_plates_render_no_results_message() {
        let view = ResultsView::from_result(&result(json!({
            "success": true, "plates": [], "source": "upload"
        })));
        assert_eq!(view, ResultsView::Empty);
        assert_eq!(view.to_string(), "No license plates detected");
    }

    #[test]
    fn full_plate_renders_every_supplied_field() {
        let view = ResultsView::from_result(&result(json!({
            "success": true,
            "source": "manual",
            "plates": [{
                "text": "ABC123",
                "confidence": 100,
                "vehicle_info": {
                    "year": 2020, "make": "Toyota", "model": "Camry", "color": "Blue",
                    "status": "active",
                    "owner": {
                        "name": "John Smith", "email": "john@example.com",
                        "phone": "555-0101", "city": "Springfield", "state": "IL"
                    }
                }
            }]
        })));

        let ResultsView::Plates { source, cards } = &view else {
            panic!("expected plates, got {view:?}");
        };
        assert_eq!(source, "manual");
        let card = &cards[0];
        assert_eq!(card.text, "ABC123");
        assert_eq!(card.confidence, "Confidence: 100%");
        let vehicle = card.vehicle.as_ref().unwrap();
        assert_eq!(vehicle.description, "2020 Toyota Camry Blue");
        assert_eq!(vehicle.status.as_deref(), Some("active"));
        assert_eq!(
            vehicle.owner,
            OwnerCard {
                name: "John Smith".into(),
                email: Some("john@example.com".into()),
                phone: Some("555-0101".into()),
                location: Some("Springfield, IL".into()),
            }
        );

        let text = view.to_string();
        assert!(text.contains("ABC123  Confidence: 100%"));
        assert!(text.contains("Owner: John Smith"));
        assert!(text.contains("Location: Springfield, IL"));
    }

    #[test]
    fn optional_owner_fields_are_omitted() {
        let view = ResultsView::from_result(&result(json!({
            "success": true,
            "source": "upload",
            "plates": [{
                "text": "XYZ9",
                "confidence": 85,
                "vehicle_info": {
                    "year": null, "make": "Ford", "model": null, "color": "Red", "status": "stolen",
                    "owner": { "name": "Ann Lee", "email": null, "city": "Austin" }
                }
            }, {
                "text": "QQ11", "confidence": 85
            }]
        })));

        let ResultsView::Plates { cards, .. } = &view else {
            panic!("expected plates");
        };
        let vehicle = cards[0].vehicle.as_ref().unwrap();
        assert_eq!(vehicle.description, "Ford Red");
        assert_eq!(vehicle.owner.email, None);
        assert_eq!(vehicle.owner.phone, None);
        assert_eq!(vehicle.owner.location, None);
        assert!(cards[1].vehicle.is_none());

        let text = view.to_string();
        assert!(!text.contains("Email:"));
        assert!(!text.contains("Phone:"));
        assert!(!text.contains("Location:"));
    }

    #[test]
    fn server_failure_shows_error() {
        let view = ResultsView::from_result(&result(json!({
            "success": false, "error": "Failed to process image"
        })));
        assert_eq!(view, ResultsView::Failure("Failed to process image".into()));
    }
}
