use crate::config::ConvertOptions;
use crate::error::{ConvertError, Result};
use crate::palette::BlockDictionary;
use crate::volume::VolumeSource;
use serde_json::Value;
use std::sync::OnceLock;

/// Everything an importer may need besides the document itself.
pub struct ImportContext<'a> {
    pub dictionary: Option<&'a BlockDictionary>,
    pub options: &'a ConvertOptions,
}

pub trait VolumeImporter: Send + Sync {
    fn name(&self) -> String;
    /// Cheap shape check on the parsed document; full validation happens in `import`.
    fn detect(&self, document: &Value) -> bool;
    fn import(&self, document: &Value, context: &ImportContext<'_>)
        -> Result<Box<dyn VolumeSource>>;
}

pub struct FormatManager {
    importers: Vec<Box<dyn VolumeImporter>>,
}

impl Default for FormatManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatManager {
    pub fn new() -> Self {
        Self {
            importers: Vec::new(),
        }
    }

    pub fn register_importer<I: VolumeImporter + 'static>(&mut self, importer: I) {
        self.importers.push(Box::new(importer));
    }

    pub fn detect_format(&self, document: &Value) -> Option<String> {
        self.importers
            .iter()
            .find(|importer| importer.detect(document))
            .map(|importer| importer.name())
    }

    pub fn import_as(
        &self,
        format: &str,
        document: &Value,
        context: &ImportContext<'_>,
    ) -> Result<Box<dyn VolumeSource>> {
        self.find(format)
            .ok_or_else(|| {
                ConvertError::Argument(format!("Unsupported input format: {}", format))
            })?
            .import(document, context)
    }

    pub fn list_importers(&self) -> Vec<String> {
        self.importers.iter().map(|i| i.name()).collect()
    }

    fn find(&self, format: &str) -> Option<&dyn VolumeImporter> {
        self.importers
            .iter()
            .find(|i| i.name().eq_ignore_ascii_case(format))
            .map(|i| i.as_ref())
    }
}

pub static MANAGER: OnceLock<FormatManager> = OnceLock::new();

pub fn get_manager() -> &'static FormatManager {
    MANAGER.get_or_init(|| {
        let mut manager = FormatManager::new();
        manager.register_importer(crate::formats::dense::DenseFormat);
        manager.register_importer(crate::formats::structure::StructureFormat);
        manager
    })
}
