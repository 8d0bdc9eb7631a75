use log::info;

use super::PriceAlert;
use crate::market::Crypto;

/// Fires every alert whose asset price crossed its target.
///
/// Fired alerts are deactivated and stamped with `now`, so each alert fires at
/// most once. Alerts for assets missing from `cryptos` are left alone.
/// Returns copies of the alerts fired by this call.
pub fn check_alerts(alerts: &mut [PriceAlert], cryptos: &[Crypto], now: &str) -> Vec<PriceAlert> {
    let mut fired = Vec::new();

    for alert in alerts.iter_mut() {
        let Some(crypto) = cryptos.iter().find(|c| c.id == alert.crypto_id) else {
            continue;
        };

        if alert.should_trigger(crypto.current_price) {
            info!(
                "alert {} fired: {} is now {} {}",
                alert.id, alert.name, alert.condition, alert.target_price
            );
            alert.is_active = false;
            alert.triggered_at = Some(now.to_string());
            fired.push(alert.clone());
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::AlertCondition;
    use crate::portfolio::fixtures::alert;

    fn crypto(id: &str, price: f64) -> Crypto {
        Crypto {
            id: id.to_string(),
            current_price: price,
            ..Default::default()
        }
    }

    const NOW: &str = "2024-06-01T12:00:00+00:00";

    #[test]
    fn test_fires_and_deactivates() {
        let mut alerts = vec![
            alert("a1", "bitcoin", AlertCondition::Above, 60_000.0),
            alert("a2", "ethereum", AlertCondition::Below, 2_000.0),
        ];
        let market = vec![crypto("bitcoin", 64_000.0), crypto("ethereum", 3_000.0)];

        let fired = check_alerts(&mut alerts, &market, NOW);

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, "a1");
        assert!(!alerts[0].is_active);
        assert_eq!(alerts[0].triggered_at.as_deref(), Some(NOW));
        assert!(alerts[1].is_active);
        assert!(alerts[1].triggered_at.is_none());
    }

    #[test]
    fn test_fires_only_once() {
        let mut alerts = vec![alert("a1", "bitcoin", AlertCondition::Below, 50_000.0)];
        let market = vec![crypto("bitcoin", 40_000.0)];

        assert_eq!(check_alerts(&mut alerts, &market, NOW).len(), 1);
        assert!(check_alerts(&mut alerts, &market, "later").is_empty());
        assert_eq!(alerts[0].triggered_at.as_deref(), Some(NOW));
    }

    #[test]
    fn test_unknown_asset_is_skipped() {
        let mut alerts = vec![alert("a1", "dogecoin", AlertCondition::Above, 0.0)];
        let fired = check_alerts(&mut alerts, &[crypto("bitcoin", 1.0)], NOW);

        assert!(fired.is_empty());
        assert!(alerts[0].is_active);
    }
}
