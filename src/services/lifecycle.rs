// src/services/lifecycle.rs
//
// A esteira do pedido como tabela explícita de sucessores. A cadeia
// canônica é linear; DRYING e PRESSING são etapas intermediárias que só
// entram na esteira via forceStatus do admin (auditado), por isso não
// aparecem como sucessoras de PROCESSING.
//
// CANCELLED não é transição normal: é uma operação própria, permitida a
// partir de qualquer estado não-terminal.

use crate::models::orders::OrderStatus;

pub fn allowed_next(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match status {
        Pending => &[PickedUp],
        PickedUp => &[Processing],
        Processing => &[Ready],
        Drying => &[Pressing],
        Pressing => &[Ready],
        Ready => &[OutForDelivery],
        OutForDelivery => &[Delivered],
        Delivered | Cancelled => &[],
    }
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_next(from).contains(&to)
}

pub fn can_cancel(status: OrderStatus) -> bool {
    !status.is_terminal()
}

// O peso real só pode ser confirmado enquanto o pedido não entrou em
// processamento.
pub fn weight_editable(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Pending | OrderStatus::PickedUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn canonical_chain_has_single_successors() {
        let chain = [Pending, PickedUp, Processing, Ready, OutForDelivery, Delivered];
        for pair in chain.windows(2) {
            assert_eq!(allowed_next(pair[0]), &[pair[1]]);
        }
        assert!(allowed_next(Delivered).is_empty());
        assert!(allowed_next(Cancelled).is_empty());
    }

    #[test]
    fn skipping_states_is_rejected() {
        // pending não pula direto para delivered
        assert!(!can_transition(Pending, Delivered));
        // picked_up não pula processing
        assert!(!can_transition(PickedUp, Ready));
        // e ninguém volta para trás
        assert!(!can_transition(Ready, Processing));
    }

    #[test]
    fn optional_finishing_steps_chain_back_into_ready() {
        assert_eq!(allowed_next(Drying), &[Pressing]);
        assert_eq!(allowed_next(Pressing), &[Ready]);
    }

    #[test]
    fn cancellation_is_allowed_from_any_non_terminal_state() {
        for status in [Pending, PickedUp, Processing, Drying, Pressing, Ready, OutForDelivery] {
            assert!(can_cancel(status));
            // ...mas nunca como transição normal da esteira.
            assert!(!can_transition(status, Cancelled));
        }
        assert!(!can_cancel(Delivered));
        assert!(!can_cancel(Cancelled));
    }

    #[test]
    fn weight_confirmation_window() {
        assert!(weight_editable(Pending));
        assert!(weight_editable(PickedUp));
        assert!(!weight_editable(Processing));
        assert!(!weight_editable(Delivered));
    }
}
