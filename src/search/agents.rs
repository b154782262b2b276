use crate::models::{Agent, Property};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Agent directory query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentQuery {
    /// Matched against name, agency and email
    pub text: Option<String>,
    /// Exact agency name, case-insensitive
    pub agency: Option<String>,
}

pub fn filter_agents(agents: &[Agent], query: &AgentQuery) -> Vec<Agent> {
    let text = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    let agency = query.agency.as_deref().map(str::trim).filter(|a| !a.is_empty());

    agents
        .iter()
        .filter(|agent| {
            text.as_deref().map_or(true, |needle| {
                agent.name.to_lowercase().contains(needle)
                    || agent.agency.to_lowercase().contains(needle)
                    || agent.email.to_lowercase().contains(needle)
            })
        })
        .filter(|agent| agency.map_or(true, |a| agent.agency.eq_ignore_ascii_case(a)))
        .cloned()
        .collect()
}

/// Distinct agents referenced by the listings, in first-seen order
pub fn agents_from_properties(properties: &[Property]) -> Vec<Agent> {
    let mut seen = HashSet::new();
    properties
        .iter()
        .filter(|p| seen.insert(p.agent.id.clone()))
        .map(|p| p.agent.clone())
        .collect()
}

pub fn listings_by_agent<'a>(properties: &'a [Property], agent_id: &str) -> Vec<&'a Property> {
    properties
        .iter()
        .filter(|p| p.is_active && p.agent.id == agent_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_properties;

    #[test]
    fn directory_is_deduplicated() {
        let properties = sample_properties();
        let agents = agents_from_properties(&properties);
        let unique: HashSet<_> = agents.iter().map(|a| a.id.clone()).collect();
        assert_eq!(unique.len(), agents.len());
        assert!(agents.len() > 1);
    }

    #[test]
    fn text_query_matches_name_or_agency() {
        let agents = agents_from_properties(&sample_properties());
        let first = &agents[0];
        let by_name = filter_agents(
            &agents,
            &AgentQuery {
                text: Some(first.name.to_uppercase()),
                agency: None,
            },
        );
        assert!(by_name.iter().any(|a| a.id == first.id));

        let by_agency = filter_agents(
            &agents,
            &AgentQuery {
                text: None,
                agency: Some(first.agency.to_lowercase()),
            },
        );
        assert!(by_agency.iter().all(|a| a.agency == first.agency));
        assert!(!by_agency.is_empty());

        let none = filter_agents(
            &agents,
            &AgentQuery {
                text: Some("no such agent".to_string()),
                agency: None,
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn listings_are_grouped_by_agent() {
        let properties = sample_properties();
        let agent_id = properties[0].agent.id.clone();
        let listings = listings_by_agent(&properties, &agent_id);
        assert!(!listings.is_empty());
        assert!(listings.iter().all(|p| p.agent.id == agent_id));
    }
}
