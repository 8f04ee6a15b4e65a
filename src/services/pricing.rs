// src/services/pricing.rs
//
// Motor de preços: funções puras sobre Decimal. Quem resolve o preço na
// tabela (price_book, por moeda) é o chamador; aqui só entra aritmética.

use rust_decimal::Decimal;

// Um adicional já resolvido na moeda do pedido. `unit_price` em None
// significa adicional sem preço cadastrado (ex: "Outro serviço" custom):
// contribui com zero e fica para o atendimento cobrar manualmente.
#[derive(Debug, Clone)]
pub struct AddOnSelection {
    pub name: String,
    pub unit_price: Option<Decimal>,
    pub quantity: i32,
}

// Custo do serviço principal. Sem peso conhecido, o preço fica adiado
// para a confirmação na coleta (política do produto, não um buraco).
pub fn service_cost(price_per_kg: Decimal, weight_kg: Option<Decimal>) -> Decimal {
    match weight_kg {
        Some(weight) => price_per_kg * weight,
        None => Decimal::ZERO,
    }
}

pub fn add_on_cost(add_on: &AddOnSelection) -> Decimal {
    match add_on.unit_price {
        Some(price) => price * Decimal::from(add_on.quantity),
        None => {
            tracing::warn!(
                "Adicional '{}' sem preço cadastrado; cobrando 0 (acompanhamento manual).",
                add_on.name
            );
            Decimal::ZERO
        }
    }
}

// Total do pedido SEM o frete. Adicionais contam mesmo sem peso
// (pedidos só de adicionais são válidos).
pub fn order_total(
    price_per_kg: Decimal,
    weight_kg: Option<Decimal>,
    add_ons: &[AddOnSelection],
) -> Decimal {
    let mut total = service_cost(price_per_kg, weight_kg);
    for add_on in add_ons {
        total += add_on_cost(add_on);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn without_weight_service_cost_is_deferred_to_zero() {
        assert_eq!(service_cost(dec(5000), None), Decimal::ZERO);
        assert_eq!(order_total(dec(5000), None, &[]), Decimal::ZERO);
    }

    #[test]
    fn with_weight_service_cost_is_rate_times_kg() {
        assert_eq!(order_total(dec(5000), Some(dec(2)), &[]), dec(10000));
    }

    #[test]
    fn standard_wash_with_flat_add_on() {
        // 3 kg a 5000/kg + terno avulso a 10000 = 25000
        let add_ons = vec![AddOnSelection {
            name: "Lavagem de terno".into(),
            unit_price: Some(dec(10000)),
            quantity: 1,
        }];
        assert_eq!(order_total(dec(5000), Some(dec(3)), &add_ons), dec(25000));
    }

    #[test]
    fn add_ons_count_even_without_weight() {
        let add_ons = vec![AddOnSelection {
            name: "Lavagem de edredom".into(),
            unit_price: Some(dec(8000)),
            quantity: 2,
        }];
        assert_eq!(order_total(dec(5000), None, &add_ons), dec(16000));
    }

    #[test]
    fn unpriced_add_on_contributes_zero() {
        let add_ons = vec![AddOnSelection {
            name: "Outro serviço".into(),
            unit_price: None,
            quantity: 3,
        }];
        assert_eq!(order_total(dec(5000), Some(dec(1)), &add_ons), dec(5000));
    }
}
