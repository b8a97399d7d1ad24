use serde::{Deserialize, Serialize};
use std::fmt;

/// Named-entity category produced by the Entity Extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Org,
    Loc,
    Product,
    Date,
    Money,
    Misc,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Person => "person",
            EntityKind::Org => "org",
            EntityKind::Loc => "loc",
            EntityKind::Product => "product",
            EntityKind::Date => "date",
            EntityKind::Money => "money",
            EntityKind::Misc => "misc",
        };
        write!(f, "{s}")
    }
}

/// Relationship label between two entities, or between an entity and the
/// document that mentions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Mentions,
    Produces,
    ProducedBy,
    WorksAt,
    Employs,
    LocatedIn,
    Hosts,
    ReleasedOn,
    ReleaseDate,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipKind::Mentions => "mentions",
            RelationshipKind::Produces => "produces",
            RelationshipKind::ProducedBy => "produced_by",
            RelationshipKind::WorksAt => "works_at",
            RelationshipKind::Employs => "employs",
            RelationshipKind::LocatedIn => "located_in",
            RelationshipKind::Hosts => "hosts",
            RelationshipKind::ReleasedOn => "released_on",
            RelationshipKind::ReleaseDate => "release_date",
        };
        write!(f, "{s}")
    }
}

/// Derives the relationship pair for a co-occurring entity pair per the
/// fixed lookup table: (subject kind, object kind) -> (forward, backward).
/// Falls through to a symmetric `Mentions` when no specific rule matches.
pub fn derive_relationship(a: EntityKind, b: EntityKind) -> (RelationshipKind, RelationshipKind) {
    use EntityKind::*;
    use RelationshipKind::*;
    match (a, b) {
        (Org, Product) => (Produces, ProducedBy),
        (Product, Org) => (ProducedBy, Produces),
        (Person, Org) => (WorksAt, Employs),
        (Org, Person) => (Employs, WorksAt),
        (Org, Loc) => (LocatedIn, Hosts),
        (Loc, Org) => (Hosts, LocatedIn),
        (Product, Date) => (ReleasedOn, ReleaseDate),
        (Date, Product) => (ReleaseDate, ReleasedOn),
        _ => (Mentions, Mentions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_product_pair_produces_produces_produced_by() {
        assert_eq!(
            derive_relationship(EntityKind::Org, EntityKind::Product),
            (RelationshipKind::Produces, RelationshipKind::ProducedBy)
        );
    }

    #[test]
    fn unrelated_pair_falls_back_to_mentions() {
        assert_eq!(
            derive_relationship(EntityKind::Misc, EntityKind::Money),
            (RelationshipKind::Mentions, RelationshipKind::Mentions)
        );
    }
}
