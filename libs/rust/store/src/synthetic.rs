use chrono::NaiveDateTime;
use forecast_model::{EntityId, SaleRecord};
use rand::seq::SliceRandom;
use rand::Rng;

pub const SYNTHETIC_PRODUCTS: [EntityId; 3] = [101, 102, 103];

/// A random sale for one of [`SYNTHETIC_PRODUCTS`], quantity in `10..=70`, stamped `now`.
pub fn synthetic_sale<R: Rng>(rng: &mut R, now: NaiveDateTime) -> SaleRecord {
    let entity_id = *SYNTHETIC_PRODUCTS.choose(rng).unwrap_or(&SYNTHETIC_PRODUCTS[0]);
    let quantity = rng.gen_range(10..=70);
    SaleRecord::new(now, entity_id, quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn stays_within_catalogue_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = chrono::NaiveDate::from_ymd_opt(2024, 5, 5).unwrap().and_hms_opt(12, 0, 0).unwrap();
        for _ in 0..500 {
            let s = synthetic_sale(&mut rng, now);
            assert!(SYNTHETIC_PRODUCTS.contains(&s.entity_id));
            assert!((10..=70).contains(&s.quantity));
            assert_eq!(s.timestamp, now);
        }
    }
}
