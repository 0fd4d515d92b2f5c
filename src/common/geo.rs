// src/common/geo.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raio médio da Terra em metros, usado na fórmula de haversine.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Coordenadas simuladas (centro de São Paulo).
pub const MOCK_COORDINATES: Coordinates = Coordinates {
    lat: -23.5505,
    lng: -46.6333,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = -23.5505)]
    pub lat: f64,
    #[schema(example = -46.6333)]
    pub lng: f64,
}

/// Distância em metros entre dois pontos pela fórmula de haversine.
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// `true` se `point` está a no máximo `radius_m` metros de `center`.
pub fn is_within_radius(point: Coordinates, center: Coordinates, radius_m: f64) -> bool {
    haversine_distance(point, center) <= radius_m
}

/// Fonte de posição simulada para testes e demonstrações: parte do centro
/// de São Paulo e aplica um deslocamento configurável, sem depender de um
/// provedor de geolocalização real.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPosition {
    offset_lat: f64,
    offset_lng: f64,
}

impl MockPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset_lat: f64, offset_lng: f64) -> Self {
        Self {
            offset_lat,
            offset_lng,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: MOCK_COORDINATES.lat + self.offset_lat,
            lng: MOCK_COORDINATES.lng + self.offset_lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distancia_entre_um_ponto_e_ele_mesmo_e_zero() {
        assert_eq!(haversine_distance(MOCK_COORDINATES, MOCK_COORDINATES), 0.0);
    }

    #[test]
    fn distancia_e_simetrica() {
        let a = MOCK_COORDINATES;
        let b = Coordinates {
            lat: -23.49,
            lng: -46.70,
        };
        let ida = haversine_distance(a, b);
        let volta = haversine_distance(b, a);
        assert!((ida - volta).abs() < 1e-9);
    }

    #[test]
    fn um_centesimo_de_grau_ao_norte_da_cerca_de_1112_metros() {
        let origem = MOCK_COORDINATES;
        let destino = Coordinates {
            lat: origem.lat + 0.01,
            lng: origem.lng,
        };
        let d = haversine_distance(origem, destino);
        // 0.01 grau de latitude ~ 1.112 m (tolerância de 5%)
        assert!((d - 1_112.0).abs() / 1_112.0 < 0.05, "distância = {d}");
    }

    #[test]
    fn verifica_raio_de_checkin() {
        let perto = MockPosition::with_offset(0.001, 0.0).coordinates();
        let longe = MockPosition::with_offset(0.1, 0.0).coordinates();
        assert!(is_within_radius(perto, MOCK_COORDINATES, 500.0));
        assert!(!is_within_radius(longe, MOCK_COORDINATES, 500.0));
    }
}
