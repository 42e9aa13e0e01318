use pricewatch_catalog::{Record, RecordDraft, RecordId, SharedRecord};
use pricewatch_shared::Store;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

const WORDS: [&str; 20] = [
    "Laptop", "Mouse", "Teclado", "Monitor", "Cámara", "Celular", "Tablet", "Audífonos",
    "Cargador", "Cable", "Gamer", "Oficina", "Pro", "Ultra", "Max", "Lite", "Negro", "Blanco",
    "Rojo", "Azul",
];

pub const MIN_PRICE: u64 = 10_000;
pub const MAX_PRICE: u64 = 5_000_000;

/// Render a price the way the storefronts do, e.g. `"$ 1.234.567"`
pub fn format_price(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("$ {}", grouped)
}

/// `count` synthetic listings with random titles, prices and stores,
/// numbered from id 0
pub fn generate_records<R: Rng>(count: usize, rng: &mut R) -> Vec<SharedRecord> {
    (0..count as u64)
        .map(|i| {
            let title = format!(
                "{} {} {}",
                WORDS.choose(rng).copied().unwrap_or("Producto"),
                WORDS.choose(rng).copied().unwrap_or("Producto"),
                rng.gen_range(0..1000)
            );
            let price = format_price(rng.gen_range(MIN_PRICE..MAX_PRICE));
            let store = Store::ALL.choose(rng).copied().unwrap_or(Store::Alkosto);

            let draft = RecordDraft::new(title, price.clone(), store)
                .with_original_price(price)
                .with_discount("0%")
                .with_image("img_mock.jpg")
                .with_url(format!("http://mock.url/{}", i));

            Arc::new(Record::new(RecordId(i), draft))
        })
        .collect()
}
