//! Keyword assembly: merge the interpreted sections of one file into a
//! single [`Keyword`] record.
//!
//! Attribute declarations define the parameter set; GUI records augment it
//! (required flag, physical dimension) by left-join on parameter name and
//! never introduce parameters of their own. Card-format bindings are
//! validated against the parameter set; an unresolved binding degrades the
//! card line rather than discarding the keyword. A file with no attribute
//! section at all still produces a keyword with an empty parameter list.

use std::collections::BTreeMap;

use crate::classify::{category_of, Classification};
use crate::defect::{Defect, DefectKind};
use crate::interpret::{attributes, format, gui, identifiers, Diagnostic};
use crate::model::{CardKind, CardLine, Keyword, Parameter};
use crate::tokenize::{Section, SectionKind};

/// Assemble one keyword from a file's tokenized sections.
pub fn assemble(
    source_path: &str,
    sections: &[Section],
    classification: &Classification,
) -> (Keyword, Vec<Defect>) {
    let mut defects = Vec::new();

    // Parameter set, in declaration order across all attribute sections.
    let mut parameters: Vec<Parameter> = Vec::new();
    for section in sections_of(sections, SectionKind::Attributes) {
        let (decls, diagnostics) = attributes::interpret(&section.body);
        push_skips(&mut defects, source_path, section, &diagnostics);
        for decl in decls {
            if decl.name.starts_with('_') {
                continue;
            }
            if parameters.iter().any(|p| p.name == decl.name) {
                defects.push(
                    section_defect(DefectKind::DeclarationSkip, source_path, section, decl.line)
                        .into_defect(format!(
                            "duplicate attribute declaration `{}`; first declaration wins",
                            decl.name
                        )),
                );
                continue;
            }
            parameters.push(Parameter {
                name: decl.name,
                value_kind: decl.value_kind,
                description: decl.description,
                dimension: None,
                required: false,
                array_size: decl.array_size,
            });
        }
    }

    // GUI left-join: augment declared parameters, report the rest.
    let mut keyword_strings: Vec<String> = Vec::new();
    let mut headers: Vec<String> = Vec::new();
    for section in sections_of(sections, SectionKind::Gui) {
        let (records, diagnostics) = gui::interpret(&section.body);
        push_skips(&mut defects, source_path, section, &diagnostics);
        keyword_strings.extend(records.keyword_strings);
        headers.extend(records.headers);
        for entry in records.entries {
            match parameters.iter_mut().find(|p| p.name == entry.name) {
                Some(parameter) => {
                    parameter.required |= entry.required;
                    if parameter.dimension.is_none() {
                        parameter.dimension = entry.dimension;
                    }
                }
                None => defects.push(
                    section_defect(DefectKind::UnresolvedReference, source_path, section, entry.line)
                        .into_defect(format!(
                            "GUI entry references undeclared parameter `{}`",
                            entry.name
                        )),
                ),
            }
        }
    }

    let (name, aliases) = derive_names(&keyword_strings, source_path);
    let header_template = keyword_strings
        .first()
        .cloned()
        .or_else(|| headers.first().cloned())
        .unwrap_or_else(|| format!("*{}", name));

    // Card format: the block targeting the classified dialect wins,
    // otherwise the first block in the file.
    let mut card_format: Vec<CardLine> = Vec::new();
    if let Some(section) = select_format_section(sections, classification) {
        let (lines, diagnostics) = format::interpret(&section.body);
        push_skips(&mut defects, source_path, section, &diagnostics);
        for line in lines {
            let mut bindings = Vec::new();
            if line.kind == CardKind::Data {
                if !line.bindings.is_empty() && line.specifier_count != line.bindings.len() {
                    defects.push(
                        section_defect(DefectKind::StructuralDefect, source_path, section, line.line)
                            .into_defect(format!(
                                "card declares {} field specifiers but binds {} parameters",
                                line.specifier_count,
                                line.bindings.len()
                            )),
                    );
                }
                for binding in line.bindings {
                    if parameters.iter().any(|p| p.name == binding) {
                        bindings.push(binding);
                    } else {
                        defects.push(
                            section_defect(
                                DefectKind::UnresolvedReference,
                                source_path,
                                section,
                                line.line,
                            )
                            .into_defect(format!(
                                "card binds unresolved parameter `{}`; field omitted",
                                binding
                            )),
                        );
                    }
                }
            }
            card_format.push(CardLine {
                kind: line.kind,
                template: line.template,
                bindings,
            });
        }
    }

    let mut identifier_map = BTreeMap::new();
    for section in sections_of(sections, SectionKind::Identifiers) {
        let (pairs, diagnostics) = identifiers::interpret_pairs(&section.body);
        push_skips(&mut defects, source_path, section, &diagnostics);
        for pair in pairs {
            identifier_map.entry(pair.name).or_insert(pair.value);
        }
    }

    let mut defaults = BTreeMap::new();
    for section in sections_of(sections, SectionKind::Defaults) {
        let (pairs, diagnostics) = identifiers::interpret_pairs(&section.body);
        push_skips(&mut defects, source_path, section, &diagnostics);
        for pair in pairs {
            defaults.entry(pair.name).or_insert(pair.value);
        }
    }

    let mut data_names = Vec::new();
    for section in sections_of(sections, SectionKind::Definitions) {
        data_names.extend(identifiers::interpret_data_names(&section.body));
    }

    let keyword = Keyword {
        name,
        aliases,
        category: category_of(source_path),
        dialect: classification.dialect,
        format_tags: classification.format_tags.clone(),
        solver_compatibility: classification.solver_compatibility.clone(),
        source_path: source_path.to_string(),
        header_template,
        parameters,
        card_format,
        identifiers: identifier_map,
        data_names,
        defaults,
    };

    (keyword, defects)
}

fn sections_of<'a>(sections: &'a [Section], kind: SectionKind) -> impl Iterator<Item = &'a Section> {
    sections.iter().filter(move |s| s.kind == kind)
}

/// Pick the format block matching the classified dialect's marker, falling
/// back to the first block in the file.
fn select_format_section<'a>(
    sections: &'a [Section],
    classification: &Classification,
) -> Option<&'a Section> {
    let marker = match classification.dialect {
        crate::model::Dialect::Radioss => Some("radioss"),
        crate::model::Dialect::LsDyna => Some("keyword"),
        crate::model::Dialect::Unknown => None,
    };
    let format_sections: Vec<&Section> = sections_of(sections, SectionKind::Format).collect();
    if let Some(marker) = marker {
        if let Some(section) = format_sections.iter().find(|s| {
            s.qualifier
                .as_deref()
                .map(|q| q.to_ascii_lowercase().contains(marker))
                .unwrap_or(false)
        }) {
            return Some(section);
        }
    }
    format_sections.first().copied()
}

/// Canonical name plus aliases from the GUI `ASSIGN(KEYWORD_STR, ...)`
/// strings, falling back to the file stem.
fn derive_names(keyword_strings: &[String], source_path: &str) -> (String, Vec<String>) {
    let mut names: Vec<String> = Vec::new();
    for raw in keyword_strings {
        let normalized = normalize_name(raw);
        if !normalized.is_empty()
            && !normalized.starts_with('_')
            && !names.contains(&normalized)
        {
            names.push(normalized);
        }
    }

    if names.is_empty() {
        names.push(name_from_stem(source_path));
    }

    let name = names.remove(0);
    (name, names)
}

fn normalize_name(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['*', '/'])
        .replace(['/', '-'], "_")
        .to_ascii_uppercase()
}

fn name_from_stem(source_path: &str) -> String {
    let file_name = source_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_path);
    let stem = file_name.strip_suffix(".cfg").unwrap_or(file_name);
    let renamed = match stem.strip_prefix("mat") {
        Some(rest) => format!("MAT_{}", rest),
        None => stem.to_string(),
    };
    renamed.replace('-', "_").to_ascii_uppercase()
}

/// Builder for a defect located inside a section, with the diagnostic's
/// body-relative line rebased onto the file.
struct SectionDefect {
    kind: DefectKind,
    source_path: String,
    section_name: &'static str,
    line: usize,
}

fn section_defect(
    kind: DefectKind,
    source_path: &str,
    section: &Section,
    body_line: usize,
) -> SectionDefect {
    SectionDefect {
        kind,
        source_path: source_path.to_string(),
        section_name: section.kind.opener(),
        line: section.body_line + body_line - 1,
    }
}

impl SectionDefect {
    fn into_defect(self, message: String) -> Defect {
        Defect::new(self.kind, self.source_path, message)
            .in_section(self.section_name)
            .at_line(self.line)
    }
}

fn push_skips(
    defects: &mut Vec<Defect>,
    source_path: &str,
    section: &Section,
    diagnostics: &[Diagnostic],
) {
    for diagnostic in diagnostics {
        defects.push(
            section_defect(DefectKind::DeclarationSkip, source_path, section, diagnostic.line)
                .into_defect(diagnostic.message.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::tokenize::tokenize;

    const RADIOSS_PATH: &str = "CFG_Openradioss/radioss2023/MAT/mat42.cfg";

    fn assemble_text(text: &str, path: &str) -> (Keyword, Vec<Defect>) {
        let (sections, mut defects) = tokenize(text, path);
        let classification = classify(path);
        let (keyword, mut more) = assemble(path, &sections, &classification);
        defects.append(&mut more);
        (keyword, defects)
    }

    #[test]
    fn merges_attributes_and_gui() {
        let text = r#"
ATTRIBUTES(COMMON) {
    PID = VALUE(INT, "Part identifier");
    RHO = VALUE(FLOAT, "Initial density");
}
GUI(COMMON) {
    ASSIGN(KEYWORD_STR, "/MAT/LAW42");
    mandatory:
    SCALAR(PID);
    SCALAR(RHO) { DIMENSION = "density"; }
}
"#;
        let (keyword, defects) = assemble_text(text, RADIOSS_PATH);
        assert!(defects.is_empty());
        assert_eq!(keyword.name, "MAT_LAW42");
        assert_eq!(keyword.header_template, "/MAT/LAW42");
        let rho = keyword.parameter("RHO").unwrap();
        assert!(rho.required);
        assert_eq!(rho.dimension.as_deref(), Some("density"));
        let pid = keyword.parameter("PID").unwrap();
        assert!(pid.required);
        assert_eq!(pid.dimension, None);
    }

    #[test]
    fn gui_reference_to_undeclared_parameter_is_a_defect() {
        let text = r#"
ATTRIBUTES(COMMON) {
    PID = VALUE(INT, "Part identifier");
}
GUI(COMMON) {
    mandatory:
    SCALAR(GHOST);
}
"#;
        let (keyword, defects) = assemble_text(text, RADIOSS_PATH);
        assert!(keyword.parameter("GHOST").is_none());
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].kind, DefectKind::UnresolvedReference);
        assert_eq!(defects[0].section.as_deref(), Some("GUI"));
    }

    #[test]
    fn card_binding_to_unresolved_parameter_degrades_the_line() {
        let text = r#"
ATTRIBUTES(COMMON) {
    PID = VALUE(INT, "Part identifier");
}
FORMAT(radioss2023) {
    CARD("%10d%10d", PID, MISSING);
}
"#;
        let (keyword, defects) = assemble_text(text, RADIOSS_PATH);
        assert_eq!(keyword.card_format.len(), 1);
        assert_eq!(keyword.card_format[0].bindings, vec!["PID"]);
        assert!(defects
            .iter()
            .any(|d| d.kind == DefectKind::UnresolvedReference && d.message.contains("MISSING")));
    }

    #[test]
    fn specifier_binding_count_mismatch_is_noted() {
        let text = r#"
ATTRIBUTES(COMMON) {
    PID = VALUE(INT, "Part identifier");
}
FORMAT(radioss2023) {
    CARD("%10d%10d", PID);
}
"#;
        let (keyword, defects) = assemble_text(text, RADIOSS_PATH);
        assert_eq!(keyword.card_format.len(), 1);
        assert!(defects
            .iter()
            .any(|d| d.kind == DefectKind::StructuralDefect && d.message.contains("specifiers")));
    }

    #[test]
    fn dialect_qualified_format_block_wins() {
        let text = r#"
ATTRIBUTES(COMMON) {
    PID = VALUE(INT, "Part identifier");
}
FORMAT(Keyword971) {
    CARD("%8d", PID);
}
FORMAT(radioss2023) {
    CARD("%10d", PID);
}
"#;
        let (keyword, _) = assemble_text(text, RADIOSS_PATH);
        assert_eq!(keyword.card_format.len(), 1);
        assert_eq!(keyword.card_format[0].template, "%10d");
    }

    #[test]
    fn file_without_attributes_still_yields_a_keyword() {
        let text = "GUI(COMMON) {\n    ASSIGN(KEYWORD_STR, \"*CONTROL_TERMINATION\");\n}\n";
        let (keyword, defects) = assemble_text(text, "dyna/Keyword971/CARDS/control.cfg");
        assert!(defects.is_empty());
        assert_eq!(keyword.name, "CONTROL_TERMINATION");
        assert!(keyword.parameters.is_empty());
        assert_eq!(keyword.category, "Cards");
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let text = "ATTRIBUTES(COMMON) {\n}\n";
        let (keyword, _) = assemble_text(text, "CFG_Openradioss/radioss2023/MAT/mat42.cfg");
        assert_eq!(keyword.name, "MAT_42");
    }

    #[test]
    fn extra_keyword_strings_become_aliases() {
        let text = r#"
GUI(COMMON) {
    ASSIGN(KEYWORD_STR, "*MAT_ELASTIC");
    ASSIGN(KEYWORD_STR, "*MAT_001");
}
"#;
        let (keyword, _) = assemble_text(text, "dyna/Keyword971/MAT/mat_elastic.cfg");
        assert_eq!(keyword.name, "MAT_ELASTIC");
        assert_eq!(keyword.aliases, vec!["MAT_001"]);
    }

    #[test]
    fn underscore_parameters_are_dropped() {
        let text = "ATTRIBUTES(COMMON) {\n    _BLANK = VALUE(INT, \"spacer\");\n    PID = VALUE(INT, \"id\");\n}\n";
        let (keyword, _) = assemble_text(text, RADIOSS_PATH);
        assert_eq!(keyword.parameters.len(), 1);
        assert_eq!(keyword.parameters[0].name, "PID");
    }

    #[test]
    fn identifier_and_default_sections_are_carried() {
        let text = r#"
ATTRIBUTES(COMMON) {
    RHO = VALUE(FLOAT, "density");
}
SKEYWORDS_IDENTIFIER(COMMON) {
    RHO = 118;
}
DEFAULTS(COMMON) {
    RHO = 0.0;
}
DEFINITIONS(COMMON) {
    DATA_NAMES = (RHO);
}
"#;
        let (keyword, defects) = assemble_text(text, RADIOSS_PATH);
        assert!(defects.is_empty());
        assert_eq!(keyword.identifiers.get("RHO").map(String::as_str), Some("118"));
        assert_eq!(keyword.defaults.get("RHO").map(String::as_str), Some("0.0"));
        assert_eq!(keyword.data_names, vec!["RHO"]);
    }
}
