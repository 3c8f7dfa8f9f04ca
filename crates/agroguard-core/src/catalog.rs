//! Static disease catalog: class keys, display names, and advisories.
//!
//! The enumeration order matches the output layer of the trained classifier;
//! index N of the probability vector corresponds to `DiseaseClass::ALL[N]`.
//! The advisory text is part of the externally observed contract (API
//! responses and PDF content) and must not be reworded.

/// Treatment and medicine advisory attached to a disease class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    /// Free-text treatment recommendation.
    pub treatment: &'static str,
    /// Free-text medicine recommendation.
    pub medicine: &'static str,
}

/// Closed set of classes the model can predict.
///
/// API responses and storage carry the [`DiseaseClass::key`] string, never
/// the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiseaseClass {
    PepperBellBacterialSpot,
    PepperBellHealthy,
    PotatoEarlyBlight,
    PotatoHealthy,
    PotatoLateBlight,
    TomatoBacterialSpot,
    TomatoEarlyBlight,
    TomatoHealthy,
    TomatoLateBlight,
    TomatoLeafMold,
    TomatoSeptoriaLeafSpot,
    TomatoSpiderMites,
    TomatoTargetSpot,
    TomatoMosaicVirus,
    TomatoYellowLeafCurlVirus,
}

impl DiseaseClass {
    /// All classes in model output order.
    pub const ALL: [DiseaseClass; 15] = [
        DiseaseClass::PepperBellBacterialSpot,
        DiseaseClass::PepperBellHealthy,
        DiseaseClass::PotatoEarlyBlight,
        DiseaseClass::PotatoHealthy,
        DiseaseClass::PotatoLateBlight,
        DiseaseClass::TomatoBacterialSpot,
        DiseaseClass::TomatoEarlyBlight,
        DiseaseClass::TomatoHealthy,
        DiseaseClass::TomatoLateBlight,
        DiseaseClass::TomatoLeafMold,
        DiseaseClass::TomatoSeptoriaLeafSpot,
        DiseaseClass::TomatoSpiderMites,
        DiseaseClass::TomatoTargetSpot,
        DiseaseClass::TomatoMosaicVirus,
        DiseaseClass::TomatoYellowLeafCurlVirus,
    ];

    /// Resolve a class from its position in the model output vector.
    pub fn from_index(index: usize) -> Option<DiseaseClass> {
        Self::ALL.get(index).copied()
    }

    /// Resolve a class from its machine-readable key.
    pub fn from_key(key: &str) -> Option<DiseaseClass> {
        Self::ALL.iter().copied().find(|class| class.key() == key)
    }

    /// Machine-readable key, stable across API and storage.
    pub fn key(self) -> &'static str {
        match self {
            DiseaseClass::PepperBellBacterialSpot => "Pepper__bell___Bacterial_spot",
            DiseaseClass::PepperBellHealthy => "Pepper__bell___healthy",
            DiseaseClass::PotatoEarlyBlight => "Potato___Early_blight",
            DiseaseClass::PotatoHealthy => "Potato___healthy",
            DiseaseClass::PotatoLateBlight => "Potato___Late_blight",
            DiseaseClass::TomatoBacterialSpot => "Tomato___Bacterial_spot",
            DiseaseClass::TomatoEarlyBlight => "Tomato___Early_blight",
            DiseaseClass::TomatoHealthy => "Tomato___healthy",
            DiseaseClass::TomatoLateBlight => "Tomato___Late_blight",
            DiseaseClass::TomatoLeafMold => "Tomato___Leaf_Mold",
            DiseaseClass::TomatoSeptoriaLeafSpot => "Tomato___Septoria_leaf_spot",
            DiseaseClass::TomatoSpiderMites => {
                "Tomato___Spider_mites_Two_spotted_spider_mite"
            }
            DiseaseClass::TomatoTargetSpot => "Tomato___Target_Spot",
            DiseaseClass::TomatoMosaicVirus => "Tomato___Tomato_mosaic_virus",
            DiseaseClass::TomatoYellowLeafCurlVirus => {
                "Tomato___Tomato_YellowLeaf__Curl_Virus"
            }
        }
    }

    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            DiseaseClass::PepperBellBacterialSpot => "Pepper Bell Bacterial Spot",
            DiseaseClass::PepperBellHealthy => "Pepper Bell Healthy",
            DiseaseClass::PotatoEarlyBlight => "Potato Early Blight",
            DiseaseClass::PotatoHealthy => "Potato Healthy",
            DiseaseClass::PotatoLateBlight => "Potato Late Blight",
            DiseaseClass::TomatoBacterialSpot => "Tomato Bacterial Spot",
            DiseaseClass::TomatoEarlyBlight => "Tomato Early Blight",
            DiseaseClass::TomatoHealthy => "Tomato Healthy",
            DiseaseClass::TomatoLateBlight => "Tomato Late Blight",
            DiseaseClass::TomatoLeafMold => "Tomato Leaf Mold",
            DiseaseClass::TomatoSeptoriaLeafSpot => "Tomato Septoria Leaf Spot",
            DiseaseClass::TomatoSpiderMites => "Tomato Spider Mites",
            DiseaseClass::TomatoTargetSpot => "Tomato Target Spot",
            DiseaseClass::TomatoMosaicVirus => "Tomato Mosaic Virus",
            DiseaseClass::TomatoYellowLeafCurlVirus => "Tomato Yellow Leaf Curl Virus",
        }
    }

    /// Static treatment/medicine advisory for this class.
    pub fn advisory(self) -> Advisory {
        match self {
            DiseaseClass::PepperBellBacterialSpot => Advisory {
                treatment: "Remove affected leaves, improve air circulation, apply copper-based fungicides, ensure proper spacing between plants",
                medicine: "Copper sulfate, Bordeaux mixture",
            },
            DiseaseClass::PepperBellHealthy => Advisory {
                treatment: "Maintain regular care, proper watering, and fertilization",
                medicine: "No treatment needed",
            },
            DiseaseClass::PotatoEarlyBlight => Advisory {
                treatment: "Remove affected leaves, improve drainage, maintain proper spacing, apply fungicide early in season",
                medicine: "Mancozeb, Chlorothalonil, Azoxystrobin",
            },
            DiseaseClass::PotatoHealthy => Advisory {
                treatment: "Continue regular care and monitoring",
                medicine: "No treatment needed",
            },
            DiseaseClass::PotatoLateBlight => Advisory {
                treatment: "Use resistant varieties, improve air circulation, apply fungicide, avoid overhead watering",
                medicine: "Metalaxyl, Chlorothalonil, Fosetyl-Al",
            },
            DiseaseClass::TomatoBacterialSpot => Advisory {
                treatment: "Remove infected leaves, improve drainage, use drip irrigation, apply copper-based fungicides",
                medicine: "Copper sulfate, Streptomycin",
            },
            DiseaseClass::TomatoEarlyBlight => Advisory {
                treatment: "Remove lower leaves, improve air circulation, mulch soil, apply fungicide",
                medicine: "Mancozeb, Chlorothalonil, Azoxystrobin",
            },
            DiseaseClass::TomatoHealthy => Advisory {
                treatment: "Continue regular monitoring and care",
                medicine: "No treatment needed",
            },
            DiseaseClass::TomatoLateBlight => Advisory {
                treatment: "Use resistant varieties, avoid overhead watering, apply fungicide preventively",
                medicine: "Chlorothalonil, Fosetyl-Al, Metalaxyl-M",
            },
            DiseaseClass::TomatoLeafMold => Advisory {
                treatment: "Improve ventilation, reduce humidity, remove infected leaves, apply fungicide",
                medicine: "Chlorothalonil, Sulfur, Triadimefon",
            },
            DiseaseClass::TomatoSeptoriaLeafSpot => Advisory {
                treatment: "Remove infected leaves, improve air circulation, apply fungicide, avoid wetting foliage",
                medicine: "Mancozeb, Chlorothalonil, Azoxystrobin",
            },
            DiseaseClass::TomatoSpiderMites => Advisory {
                treatment: "Spray water to remove mites, use miticides, release predatory mites, reduce dust",
                medicine: "Permethrin, Abamectin, Neem oil",
            },
            DiseaseClass::TomatoTargetSpot => Advisory {
                treatment: "Remove infected leaves, improve air circulation, apply fungicide, use resistant varieties",
                medicine: "Chlorothalonil, Mancozeb, Azoxystrobin",
            },
            DiseaseClass::TomatoMosaicVirus => Advisory {
                treatment: "Remove infected plants, control aphids, use virus-free seeds, sanitize tools",
                medicine: "No chemical cure, prevention through clean culture",
            },
            DiseaseClass::TomatoYellowLeafCurlVirus => Advisory {
                treatment: "Control whiteflies, use resistant varieties, remove infected plants, use netting",
                medicine: "Insecticide for whitefly control",
            },
        }
    }
}

/// Generic advisory returned when a stored key no longer maps to a class.
pub fn fallback_advisory() -> Advisory {
    Advisory {
        treatment: "Consult agricultural expert",
        medicine: "Unknown",
    }
}

/// Advisory for a stored class key, falling back for unknown keys.
pub fn advisory_for_key(key: &str) -> Advisory {
    DiseaseClass::from_key(key)
        .map(DiseaseClass::advisory)
        .unwrap_or_else(fallback_advisory)
}

/// Display name for a stored class key, falling back to the key itself.
pub fn display_name_for_key(key: &str) -> &str {
    DiseaseClass::from_key(key)
        .map(DiseaseClass::display_name)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::{DiseaseClass, advisory_for_key, display_name_for_key, fallback_advisory};
    use pretty_assertions::assert_eq;

    #[test]
    fn index_order_matches_model_output() {
        assert_eq!(
            DiseaseClass::from_index(0),
            Some(DiseaseClass::PepperBellBacterialSpot)
        );
        assert_eq!(DiseaseClass::from_index(7), Some(DiseaseClass::TomatoHealthy));
        assert_eq!(
            DiseaseClass::from_index(14),
            Some(DiseaseClass::TomatoYellowLeafCurlVirus)
        );
        assert_eq!(DiseaseClass::from_index(15), None);
    }

    #[test]
    fn keys_round_trip() {
        for class in DiseaseClass::ALL {
            assert_eq!(DiseaseClass::from_key(class.key()), Some(class));
        }
    }

    #[test]
    fn healthy_classes_need_no_treatment() {
        for class in [
            DiseaseClass::PepperBellHealthy,
            DiseaseClass::PotatoHealthy,
            DiseaseClass::TomatoHealthy,
        ] {
            assert_eq!(class.advisory().medicine, "No treatment needed");
        }
    }

    #[test]
    fn unknown_keys_fall_back() {
        assert_eq!(advisory_for_key("Wheat___rust"), fallback_advisory());
        assert_eq!(display_name_for_key("Wheat___rust"), "Wheat___rust");
        assert_eq!(
            display_name_for_key("Tomato___healthy"),
            "Tomato Healthy"
        );
    }
}
