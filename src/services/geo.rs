// src/services/geo.rs
//
// Distância de coleta/entrega: Haversine até a origem do negócio, com a
// cobrança arredondada SEMPRE para cima no km inteiro (0.1 km cobra 1 km).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuote {
    pub distance_km: f64,
    pub billed_km: i64,
    pub fee: Decimal,
}

// Fórmula do grande círculo. Sempre não-negativa.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// Km cobrado: teto da distância real. Nunca para baixo.
pub fn billed_km(distance_km: f64) -> i64 {
    if distance_km <= 0.0 {
        return 0;
    }
    distance_km.ceil() as i64
}

// Sem coordenada de coleta (endereço digitado sem GPS) a cotação é zero —
// nunca um erro.
pub fn delivery_quote(
    pickup: Option<Coordinates>,
    origin: Coordinates,
    rate_per_km: Decimal,
) -> DeliveryQuote {
    let Some(pickup) = pickup else {
        return DeliveryQuote {
            distance_km: 0.0,
            billed_km: 0,
            fee: Decimal::ZERO,
        };
    };

    let distance_km = haversine_km(pickup, origin);
    let billed = billed_km(distance_km);
    DeliveryQuote {
        distance_km,
        billed_km: billed,
        fee: Decimal::from(billed) * rate_per_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };

    fn at_lat(lat: f64) -> Coordinates {
        Coordinates { lat, lng: 0.0 }
    }

    #[test]
    fn haversine_is_zero_for_same_point() {
        let p = Coordinates { lat: -23.55, lng: -46.63 };
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn sub_kilometer_trips_bill_as_one() {
        // ~0.11 km (0.001 grau de latitude)
        let d = haversine_km(at_lat(0.001), ORIGIN);
        assert!(d > 0.0 && d < 1.0);
        assert_eq!(billed_km(d), 1);

        assert_eq!(billed_km(0.42), 1);
        assert_eq!(billed_km(1.0), 1);
        assert_eq!(billed_km(1.0001), 2);
    }

    #[test]
    fn fee_is_monotonic_in_distance() {
        let rate = Decimal::from(2000);
        let mut last = Decimal::MIN;
        for lat in [0.0, 0.001, 0.01, 0.02, 0.05, 0.1, 0.5] {
            let quote = delivery_quote(Some(at_lat(lat)), ORIGIN, rate);
            assert!(quote.fee >= last);
            last = quote.fee;
        }
    }

    #[test]
    fn missing_pickup_coordinate_quotes_zero() {
        let quote = delivery_quote(None, ORIGIN, Decimal::from(2000));
        assert_eq!(quote.distance_km, 0.0);
        assert_eq!(quote.billed_km, 0);
        assert_eq!(quote.fee, Decimal::ZERO);
    }

    #[test]
    fn four_point_three_km_bills_five() {
        // 0.0387 grau de latitude ~ 4.30 km
        let pickup = at_lat(0.0387);
        let d = haversine_km(pickup, ORIGIN);
        assert!(d > 4.0 && d < 4.5);

        let quote = delivery_quote(Some(pickup), ORIGIN, Decimal::from(2000));
        assert_eq!(quote.billed_km, 5);
        assert_eq!(quote.fee, Decimal::from(10000));
    }
}
