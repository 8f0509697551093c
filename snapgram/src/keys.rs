/// Redis key-construction helpers.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
    pub service: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str, service: &'a str) -> Self {
        Self { prefix, service }
    }

    pub fn document(&self, collection: &str, document_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, document_id)
    }

    /// Set holding every document id of a collection; queries scan it.
    pub fn collection_index(&self, collection: &str) -> String {
        format!("{}:{}:idx:{}", self.prefix, self.service, collection)
    }

    /// Pub/sub channel carrying change events for one collection.
    pub fn changes(&self, collection: &str) -> String {
        format!("{}:{}:changes:{}", self.prefix, self.service, collection)
    }
}
