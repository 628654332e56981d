use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::error::FieldErrors;
use crate::form::{
    ResourceForm, FIELD_CONFIGURATION, FIELD_DESCRIPTION, FIELD_GROUP_SIZE, FIELD_ID, FIELD_TITLE,
    FIELD_TYPE, FIELD_VIDEO,
};
use crate::models::{
    Category, PublicationStatus, ResourceConfiguration, ResourceRef, ResourceType,
};

/// Fields of the resource form in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    Identifier,
    Type,
    Configuration,
    GroupSize,
    Description,
    Categories,
    AlternativeNames,
    Related,
    Video,
    ShowIntroduction,
    Status,
}

impl FormField {
    const ORDER: [FormField; 12] = [
        Self::Title,
        Self::Identifier,
        Self::Type,
        Self::Configuration,
        Self::GroupSize,
        Self::Description,
        Self::Categories,
        Self::AlternativeNames,
        Self::Related,
        Self::Video,
        Self::ShowIntroduction,
        Self::Status,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Identifier => "URL",
            Self::Type => "Type",
            Self::Configuration => "Configuration",
            Self::GroupSize => "Group size",
            Self::Description => "Description",
            Self::Categories => "Categories",
            Self::AlternativeNames => "Also known as",
            Self::Related => "Related",
            Self::Video => "Video id",
            Self::ShowIntroduction => "Show intro",
            Self::Status => "Submit as",
        }
    }

    /// Key of the validation messages for this field.
    fn error_key(self) -> Option<&'static str> {
        match self {
            Self::Title => Some(FIELD_TITLE),
            Self::Identifier => Some(FIELD_ID),
            Self::Type => Some(FIELD_TYPE),
            Self::Configuration => Some(FIELD_CONFIGURATION),
            Self::GroupSize => Some(FIELD_GROUP_SIZE),
            Self::Description => Some(FIELD_DESCRIPTION),
            Self::Video => Some(FIELD_VIDEO),
            _ => None,
        }
    }

    fn step(self, offset: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0) as isize;
        Self::ORDER[(index + offset).rem_euclid(len) as usize]
    }

    pub(crate) fn is_text(self) -> bool {
        matches!(
            self,
            Self::Title
                | Self::Identifier
                | Self::GroupSize
                | Self::Description
                | Self::AlternativeNames
                | Self::Video
                | Self::ShowIntroduction
        )
    }
}

/// Terminal state wrapped around [`ResourceForm`]: focus, pick-list cursors,
/// the pending tag input and the latest validation result.
pub(crate) struct FormState {
    pub(crate) form: ResourceForm,
    pub(crate) active: FormField,
    pub(crate) category_options: Vec<Category>,
    pub(crate) category_cursor: usize,
    pub(crate) related_options: Vec<ResourceRef>,
    pub(crate) related_cursor: usize,
    pub(crate) tag_input: String,
    pub(crate) status: PublicationStatus,
    pub(crate) errors: FieldErrors,
    /// Top-level notice, e.g. a duplicate URL.
    pub(crate) notice: Option<String>,
}

impl FormState {
    pub(crate) fn new(
        form: ResourceForm,
        category_options: Vec<Category>,
        related_options: Vec<ResourceRef>,
    ) -> Self {
        let status = if form.proposal_of().is_some() {
            PublicationStatus::ReadyForReview
        } else {
            PublicationStatus::Draft
        };
        Self {
            form,
            active: FormField::Title,
            category_options,
            category_cursor: 0,
            related_options,
            related_cursor: 0,
            tag_input: String::new(),
            status,
            errors: FieldErrors::new(),
            notice: None,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        if self.form.proposal_of().is_some() {
            "Propose Changes"
        } else {
            "Create Resource"
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.step(1);
        if self.active == FormField::Configuration && self.form.kind() != ResourceType::Exercise {
            self.active = self.active.step(1);
        }
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.step(-1);
        if self.active == FormField::Configuration && self.form.kind() != ResourceType::Exercise {
            self.active = self.active.step(-1);
        }
    }

    /// Insert a character into the active text field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || !self.active.is_text() {
            return false;
        }
        match self.active {
            FormField::Title => {
                let mut title = self.form.title().to_string();
                title.push(ch);
                self.form.set_title(title);
            }
            FormField::Identifier => {
                let mut identifier = self.form.identifier().to_string();
                identifier.push(ch);
                self.form.set_identifier(identifier);
            }
            FormField::GroupSize => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.form.group_size.push(ch);
            }
            FormField::Description => self.form.description.push(ch),
            FormField::AlternativeNames => self.tag_input.push(ch),
            FormField::Video => self.form.video.push(ch),
            FormField::ShowIntroduction => self.form.show_introduction.push(ch),
            _ => return false,
        }
        true
    }

    /// Remove a character from the active field. On the tag field an empty
    /// input removes the last tag instead.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Title => {
                let mut title = self.form.title().to_string();
                title.pop();
                self.form.set_title(title);
            }
            FormField::Identifier => {
                let mut identifier = self.form.identifier().to_string();
                identifier.pop();
                self.form.set_identifier(identifier);
            }
            FormField::GroupSize => {
                self.form.group_size.pop();
            }
            FormField::Description => {
                self.form.description.pop();
            }
            FormField::AlternativeNames => {
                if self.tag_input.pop().is_none() {
                    self.form.pop_alternative_name();
                }
            }
            FormField::Video => {
                self.form.video.pop();
            }
            FormField::ShowIntroduction => {
                self.form.show_introduction.pop();
            }
            _ => {}
        }
    }

    /// Left/right on choice fields: cycle enums or move pick-list cursors.
    pub(crate) fn cycle(&mut self, offset: isize) {
        match self.active {
            FormField::Type => {
                let next = cycle_value(&ResourceType::ALL, self.form.kind(), offset);
                self.form.set_kind(next);
            }
            FormField::Configuration => {
                if let Some(current) = self.form.configuration() {
                    let next = cycle_value(&ResourceConfiguration::ALL, current, offset);
                    self.form.set_configuration(next);
                }
            }
            FormField::Categories => {
                self.category_cursor =
                    cycle_index(self.category_cursor, self.category_options.len(), offset);
            }
            FormField::Related => {
                self.related_cursor =
                    cycle_index(self.related_cursor, self.related_options.len(), offset);
            }
            FormField::Status => {
                self.status = match self.status {
                    PublicationStatus::Draft => PublicationStatus::ReadyForReview,
                    _ => PublicationStatus::Draft,
                };
            }
            _ => {}
        }
    }

    /// Space on a pick list toggles the highlighted option. Returns `false`
    /// when the active field is not a pick list.
    pub(crate) fn toggle_option(&mut self) -> bool {
        match self.active {
            FormField::Categories => {
                if let Some(category) = self.category_options.get(self.category_cursor) {
                    self.form.toggle_category(category);
                }
                true
            }
            FormField::Related => {
                if let Some(reference) = self.related_options.get(self.related_cursor) {
                    self.form.toggle_related(reference.clone());
                }
                true
            }
            _ => false,
        }
    }

    /// Enter on the tag field turns the pending input into a tag. Returns
    /// `false` when there was nothing to add, meaning Enter should submit.
    pub(crate) fn commit_tag(&mut self) -> bool {
        if self.active != FormField::AlternativeNames || self.tag_input.trim().is_empty() {
            return false;
        }
        let input = std::mem::take(&mut self.tag_input);
        if !self.form.add_alternative_name(&input) {
            self.notice = Some(format!("`{}` cannot be added as a name.", input.trim()));
        }
        true
    }

    /// Visible fields. Configuration only exists for exercises.
    pub(crate) fn fields(&self) -> Vec<FormField> {
        FormField::ORDER
            .into_iter()
            .filter(|field| {
                *field != FormField::Configuration || self.form.kind() == ResourceType::Exercise
            })
            .collect()
    }

    fn display_value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.form.title().to_string(),
            FormField::Identifier => {
                let suffix = if self.form.identifier_manually_edited() {
                    ""
                } else {
                    "  (from title)"
                };
                format!("/resource/{}{suffix}", self.form.identifier())
            }
            FormField::Type => format!("< {} >", self.form.kind().decorated_label()),
            FormField::Configuration => self
                .form
                .configuration()
                .map(|configuration| format!("< {} >", configuration.decorated_label()))
                .unwrap_or_default(),
            FormField::GroupSize => self.form.group_size.clone(),
            FormField::Description => self.form.description.clone(),
            FormField::Categories => pick_list_summary(
                self.category_options
                    .get(self.category_cursor)
                    .map(|category| {
                        (
                            category.name.as_str(),
                            self.form.has_category(&category.id),
                        )
                    }),
                self.form
                    .categories()
                    .iter()
                    .map(|category| category.name.as_str())
                    .collect(),
            ),
            FormField::AlternativeNames => {
                let mut parts: Vec<String> = self
                    .form
                    .alternative_names()
                    .iter()
                    .map(|name| format!("({name})"))
                    .collect();
                parts.push(self.tag_input.clone());
                parts.join(" ")
            }
            FormField::Related => pick_list_summary(
                self.related_options
                    .get(self.related_cursor)
                    .map(|reference| {
                        (
                            reference.title.as_str(),
                            self.form.related().iter().any(|r| r.id == reference.id),
                        )
                    }),
                self.form
                    .related()
                    .iter()
                    .map(|reference| reference.title.as_str())
                    .collect(),
            ),
            FormField::Video => self.form.video.clone(),
            FormField::ShowIntroduction => self.form.show_introduction.clone(),
            FormField::Status => format!("< {} >", self.status.label()),
        }
    }

    /// Render a field line, followed by its first validation message if any.
    pub(crate) fn build_lines(&self, field: FormField) -> Vec<Line<'static>> {
        let is_active = self.active == field;
        let value = self.display_value(field);
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let display = if value.is_empty() && !is_active {
            "<empty>".to_string()
        } else {
            value
        };

        let mut lines = vec![Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])];

        if let Some(message) = field.error_key().and_then(|key| self.errors.first(key)) {
            lines.push(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }

    /// Character count of the editable text in `field`, for cursor placement.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        match field {
            FormField::Title => self.form.title().chars().count(),
            FormField::Identifier => "/resource/".len() + self.form.identifier().chars().count(),
            FormField::GroupSize => self.form.group_size.chars().count(),
            FormField::Description => self.form.description.chars().count(),
            FormField::AlternativeNames => self.display_value(field).chars().count(),
            FormField::Video => self.form.video.chars().count(),
            FormField::ShowIntroduction => self.form.show_introduction.chars().count(),
            _ => 0,
        }
    }
}

fn cycle_index(current: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + offset).rem_euclid(len as isize) as usize
}

fn cycle_value<T: Copy + PartialEq>(all: &[T], current: T, offset: isize) -> T {
    let index = all.iter().position(|value| *value == current).unwrap_or(0);
    all[cycle_index(index, all.len(), offset)]
}

fn pick_list_summary(highlighted: Option<(&str, bool)>, chosen: Vec<&str>) -> String {
    let cursor = match highlighted {
        Some((label, checked)) => {
            let mark = if checked { "[x]" } else { "[ ]" };
            format!("< {mark} {label} >")
        }
        None => "< none available >".to_string(),
    };
    if chosen.is_empty() {
        cursor
    } else {
        format!("{cursor}  chosen: {}", chosen.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FormState {
        FormState::new(
            ResourceForm::new(),
            vec![
                Category {
                    id: "focus".into(),
                    name: "Focus".into(),
                },
                Category {
                    id: "warmup".into(),
                    name: "Warm-up".into(),
                },
            ],
            Vec::new(),
        )
    }

    #[test]
    fn typing_a_title_derives_the_identifier() {
        let mut state = state();
        for ch in "Zip Zap!".chars() {
            state.push_char(ch);
        }
        assert_eq!(state.form.identifier(), "zip-zap");

        state.next_field();
        assert_eq!(state.active, FormField::Identifier);
        state.backspace();
        state.previous_field();
        state.push_char('s');
        assert_eq!(state.form.identifier(), "zip-za");
    }

    #[test]
    fn configuration_is_skipped_for_non_exercises() {
        let mut state = state();
        state.active = FormField::Type;
        state.cycle(1);
        assert_eq!(state.form.kind(), ResourceType::ShortForm);
        state.next_field();
        assert_eq!(state.active, FormField::GroupSize);
        assert!(!state.fields().contains(&FormField::Configuration));
    }

    #[test]
    fn pick_lists_toggle_highlighted_option() {
        let mut state = state();
        state.active = FormField::Categories;
        state.cycle(1);
        assert!(state.toggle_option());
        assert!(state.form.has_category("warmup"));
        assert!(!state.form.has_category("focus"));
    }

    #[test]
    fn tags_commit_on_enter_and_pop_on_empty_backspace() {
        let mut state = state();
        state.active = FormField::AlternativeNames;
        for ch in "Zip Zop".chars() {
            state.push_char(ch);
        }
        assert!(state.commit_tag());
        assert_eq!(state.form.alternative_names(), ["Zip Zop".to_string()]);
        assert!(!state.commit_tag());

        state.backspace();
        assert!(state.form.alternative_names().is_empty());
    }
}
