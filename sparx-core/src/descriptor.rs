// Build descriptor model and XML serialization

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// SDK identifier declared on the descriptor root.
pub const SDK: &str = "Ember.Sdk";

/// Target runtime the external build tool compiles against.
pub const TARGET_RUNTIME: &str = "ember-2.0";

/// One binary reference: the name the compiler imports it by, and the
/// path the build tool loads the artifact from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub include: String,
    pub hint_path: PathBuf,
}

/// Structural representation of the project file consumed by `emberc`.
///
/// The reference list is ordered; serialization preserves it, so equal
/// descriptors serialize to identical documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub sdk: String,
    pub target_runtime: String,
    pub references: Vec<Reference>,
}

impl BuildDescriptor {
    pub fn new() -> Self {
        Self {
            sdk: SDK.to_string(),
            target_runtime: TARGET_RUNTIME.to_string(),
            references: Vec::new(),
        }
    }

    pub fn push_reference(&mut self, include: String, hint_path: PathBuf) {
        self.references.push(Reference { include, hint_path });
    }

    /// Serialize to the XML project-file format.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        let mut project = BytesStart::new("Project");
        project.push_attribute(("Sdk", self.sdk.as_str()));
        writer.write_event(Event::Start(project))?;

        writer.write_event(Event::Start(BytesStart::new("PropertyGroup")))?;
        write_text_element(&mut writer, "TargetRuntime", &self.target_runtime)?;
        writer.write_event(Event::End(BytesEnd::new("PropertyGroup")))?;

        writer.write_event(Event::Start(BytesStart::new("ItemGroup")))?;
        for reference in &self.references {
            let mut element = BytesStart::new("Reference");
            element.push_attribute(("Include", reference.include.as_str()));
            writer.write_event(Event::Start(element))?;
            write_text_element(
                &mut writer,
                "HintPath",
                &reference.hint_path.to_string_lossy(),
            )?;
            writer.write_event(Event::End(BytesEnd::new("Reference")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("ItemGroup")))?;

        writer.write_event(Event::End(BytesEnd::new("Project")))?;

        let document = String::from_utf8(writer.into_inner())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        Ok(document)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }
}

impl Default for BuildDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
