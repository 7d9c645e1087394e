//! Seleção heurística de sensores por dicas de nome.
//!
//! Vários sensores da mesma classe competem (carga total vs. core máximo,
//! `Tctl` vs. `CCD1`...). A escolha é feita por uma lista ordenada de
//! substrings: a primeira dica com match vence; sem match, vale o primeiro
//! sensor da classe de métrica.

use crate::provider::Sensor;
use overlay_core::types::MetricClass;

/// Escolhe um sensor da classe `metric` seguindo `hints` em ordem de prioridade.
pub fn select_sensor<'a, S: AsRef<str>>(
    sensors: &'a [Sensor],
    metric: MetricClass,
    hints: &[S],
) -> Option<&'a Sensor> {
    let candidates = || sensors.iter().filter(move |s| s.metric == metric);

    for hint in hints {
        let hint = hint.as_ref().to_lowercase();
        if hint.is_empty() {
            continue;
        }
        if let Some(sensor) = candidates().find(|s| s.name.to_lowercase().contains(&hint)) {
            return Some(sensor);
        }
    }

    candidates().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_sensors() -> Vec<Sensor> {
        vec![
            Sensor::new(MetricClass::Clock, "Core #1", Some(4500.0)),
            Sensor::new(MetricClass::Load, "CPU Core Max", Some(55.9)),
            Sensor::new(MetricClass::Load, "CPU Total", Some(30.2)),
            Sensor::new(MetricClass::Temperature, "Core (Tctl/Tdie)", Some(61.0)),
            Sensor::new(MetricClass::Temperature, "CCD1 (Tdie)", Some(58.0)),
        ]
    }

    #[test]
    fn first_matching_hint_wins() {
        let sensors = cpu_sensors();
        let s = select_sensor(&sensors, MetricClass::Load, &["Total", "Core Max"]).unwrap();
        assert_eq!(s.name, "CPU Total");
        let s = select_sensor(&sensors, MetricClass::Load, &["Core Max", "Total"]).unwrap();
        assert_eq!(s.name, "CPU Core Max");
    }

    #[test]
    fn hint_priority_beats_sensor_order() {
        let sensors = cpu_sensors();
        // "Tdie" aparece nos dois sensores; "CCD1" tem prioridade
        let s = select_sensor(&sensors, MetricClass::Temperature, &["CCD1", "Tdie"]).unwrap();
        assert_eq!(s.name, "CCD1 (Tdie)");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let sensors = cpu_sensors();
        let s = select_sensor(&sensors, MetricClass::Temperature, &["tctl"]).unwrap();
        assert_eq!(s.name, "Core (Tctl/Tdie)");
    }

    #[test]
    fn falls_back_to_first_sensor_of_metric() {
        let sensors = cpu_sensors();
        let s = select_sensor(&sensors, MetricClass::Load, &["Package"]).unwrap();
        assert_eq!(s.name, "CPU Core Max");
        let none: [&str; 0] = [];
        let s = select_sensor(&sensors, MetricClass::Temperature, &none).unwrap();
        assert_eq!(s.name, "Core (Tctl/Tdie)");
    }

    #[test]
    fn hints_never_cross_metric_classes() {
        let sensors = cpu_sensors();
        // "Core #1" é Clock, não pode ser escolhido para Load
        let s = select_sensor(&sensors, MetricClass::Load, &["#1"]).unwrap();
        assert_eq!(s.metric, MetricClass::Load);
        assert!(select_sensor(&sensors, MetricClass::Fan, &["Core"]).is_none());
    }
}
