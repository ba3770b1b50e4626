use crud_filter::ResourceSchema;

/// How a relation path reaches a related table.
///
/// `EXISTS (SELECT 1 FROM <table> WHERE <table>.<foreign_key> = <base>.<local_key> AND ...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationLink {
    /// Relation path as used in filter keys (`"schedules"` in `schedules.schedule_id`).
    pub path: &'static str,
    /// Related table.
    pub table: &'static str,
    /// Column of the base table the relation joins on.
    pub local_key: &'static str,
    /// Column of the related table pointing at `local_key`.
    pub foreign_key: &'static str,
}

/// Physical table behind a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBinding {
    pub table: &'static str,
    pub schema: ResourceSchema,
    pub relations: &'static [RelationLink],
}

impl TableBinding {
    /// Binding without relations.
    #[must_use]
    pub const fn new(table: &'static str, schema: ResourceSchema) -> Self {
        Self {
            table,
            schema,
            relations: &[],
        }
    }

    #[must_use]
    pub const fn with_relations(mut self, relations: &'static [RelationLink]) -> Self {
        self.relations = relations;
        self
    }

    /// The link registered for a relation path.
    #[must_use]
    pub fn relation(&self, path: &str) -> Option<&RelationLink> {
        self.relations.iter().find(|r| r.path == path)
    }
}
