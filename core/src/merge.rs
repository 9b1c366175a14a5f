// core/src/merge.rs
//! Sammenslåing av delvise fangster av samme økt.
//!
//! Slag justeres på posisjon (indeks i klubbgruppen), ikke på innhold.
//! Strategien ligger bak `MergeStrategy` slik at en innholdsbasert variant
//! kan byttes inn uten å røre resten av flyten.

use crate::models::{ClubGroup, MetricMap, SessionData, Shot};

/// Hvordan slagene til to grupper med samme kølle forenes.
pub trait MergeStrategy {
    /// Flett `incoming` inn i `existing`. Senere verdier vinner ved kollisjon.
    fn merge_shots(&self, existing: &mut Vec<Shot>, incoming: &[Shot]);
}

/// Slag `i` i ny gruppe flettes inn i slag `i` i eksisterende gruppe.
/// Overskytende nye slag legges til bakerst uendret.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalMerge;

impl MergeStrategy for PositionalMerge {
    fn merge_shots(&self, existing: &mut Vec<Shot>, incoming: &[Shot]) {
        if existing.len() != incoming.len() {
            log::debug!(
                "positional merge: {} eksisterende vs {} nye slag",
                existing.len(),
                incoming.len()
            );
        }
        for (i, new_shot) in incoming.iter().enumerate() {
            match existing.get_mut(i) {
                // Bare metrikkene flettes; nummer og tag beholdes fra eksisterende slag
                Some(old) => union_into(&mut old.metrics, &new_shot.metrics),
                None => existing.push(new_shot.clone()),
            }
        }
    }
}

// Nye verdier vinner (last-writer-wins)
fn union_into(dst: &mut MetricMap, src: &MetricMap) {
    for (k, v) in src {
        dst.insert(k.clone(), v.clone());
    }
}

/// Økt-fletter parametrisert over slag-strategien.
#[derive(Debug, Clone, Default)]
pub struct SessionMerger<S: MergeStrategy = PositionalMerge> {
    strategy: S,
}

impl<S: MergeStrategy> SessionMerger<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Returnerer en ny økt; ingen av inputene endres.
    /// Identitetsfelt (dato, rapport-id, url-type, parametre, kilde) arves fra `base`.
    pub fn merge(&self, base: &SessionData, incoming: &SessionData) -> SessionData {
        let mut clubs: Vec<ClubGroup> = Vec::with_capacity(base.club_groups.len());

        // Duplikate navn i base: første posisjon beholdes, siste gruppe vinner
        for group in &base.club_groups {
            match position_of(&clubs, &group.club_name) {
                Some(i) => clubs[i] = group.clone(),
                None => clubs.push(group.clone()),
            }
        }

        for group in &incoming.club_groups {
            match position_of(&clubs, &group.club_name) {
                Some(i) => {
                    log::debug!("merge: kølle {:?} finnes, fletter", group.club_name);
                    let target = &mut clubs[i];
                    union_into(&mut target.averages, &group.averages);
                    union_into(&mut target.consistency, &group.consistency);
                    self.strategy.merge_shots(&mut target.shots, &group.shots);
                }
                None => {
                    log::debug!("merge: ny kølle {:?}", group.club_name);
                    clubs.push(group.clone());
                }
            }
        }

        let mut merged = SessionData {
            club_groups: clubs,
            metric_names: Vec::new(),
            ..base.clone()
        };
        merged.recompute_metric_names();
        merged
    }
}

fn position_of(clubs: &[ClubGroup], name: &str) -> Option<usize> {
    clubs.iter().position(|c| c.club_name == name)
}

/// Posisjonell sammenslåing av `incoming` inn i `base`.
pub fn merge_session_data(base: &SessionData, incoming: &SessionData) -> SessionData {
    SessionMerger::new(PositionalMerge).merge(base, incoming)
}
