use crate::models::{ActuatorLogTable, PreferenceTable, Table};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(mut tables: Vec<Box<dyn Table>>) -> Self {
        Self::sort_tables(&mut tables);
        Self { tables }
    }

    /// Orders tables so that every table follows the tables it references.
    fn sort_tables(tables: &mut Vec<Box<dyn Table>>) {
        let mut pending = std::mem::take(tables);
        let mut sorted: Vec<Box<dyn Table>> = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let ready = pending.iter().position(|table| {
                table
                    .dependencies()
                    .iter()
                    .all(|dependency| sorted.iter().any(|done| done.name() == *dependency))
            });

            let index = ready.expect("Circular dependency detected or unresolved dependencies exist.");
            sorted.push(pending.remove(index));
        }

        *tables = sorted;
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![Box::new(PreferenceTable), Box::new(ActuatorLogTable)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockFarmTable;

    impl Table for MockFarmTable {
        fn name(&self) -> &'static str {
            "farms"
        }

        fn create(&self) -> String {
            "CREATE TABLE farms;".to_string()
        }

        fn dispose(&self) -> String {
            "DROP TABLE farms;".to_string()
        }

        fn dependencies(&self) -> Vec<&'static str> {
            vec![]
        }
    }

    struct MockReadingTable;

    impl Table for MockReadingTable {
        fn name(&self) -> &'static str {
            "readings"
        }

        fn create(&self) -> String {
            "CREATE TABLE readings;".to_string()
        }

        fn dispose(&self) -> String {
            "DROP TABLE readings;".to_string()
        }

        fn dependencies(&self) -> Vec<&'static str> {
            vec!["farms"]
        }
    }

    #[test]
    fn test_creation_order_follows_dependencies() {
        let manager = SchemaManager::new(vec![Box::new(MockReadingTable), Box::new(MockFarmTable)]);

        assert_eq!(manager.create_schema(), vec!["CREATE TABLE farms;", "CREATE TABLE readings;"]);
        assert_eq!(manager.dispose_schema(), vec!["DROP TABLE readings;", "DROP TABLE farms;"]);
    }

    #[test]
    fn test_default_schema_is_complete() {
        let statements = SchemaManager::default().create_schema().join("\n");

        assert!(statements.contains("preferences"));
        assert!(statements.contains("actuator_log"));
    }
}
