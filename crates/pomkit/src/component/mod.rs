//! Page-object component tree.
//!
//! A [`Component`] owns its children in a `BTreeMap<String, Child>`. [`Child`]
//! is a tagged variant, so recovering a specialized component (a [`Field`] out
//! of a form, a [`Column`] out of a datatable) is a pattern match rather than
//! a runtime type check. Specializations wrap a base [`Component`] and deref to
//! it, sharing the locator, children and request bookkeeping.
//!
//! ```text
//! Page
//!  ├── Form ── Field ── Menu (<field>_menu)
//!  │        └─ Button (SUBMIT)
//!  └── Datatable ── Column ── filter Field / sort Button
//!               └─ _total, _pagesize, _nextpage, ...
//! ```

mod action;
mod base;
mod button;
mod column;
mod datatable;
mod field;
mod form;
mod graph;
mod menu;
mod page;
mod request;

pub use action::{Action, ActionCall, Actionable, AssertionCall, Check};
pub use base::Component;
pub use button::{Button, ButtonEntry};
pub use column::{Column, SortState};
pub use datatable::{total_pages_for, Datatable, PaginationControl};
pub use field::{Field, FieldEntry};
pub use form::{is_truthy, Form};
pub use graph::{Graph, GraphEntry};
pub use menu::{
    Menu, CHECKBOX_FALLBACK_CLASSES, CHECKBOX_SELECTOR, DISABLED_OPTION_SELECTOR,
    SELECTED_OPTION_SELECTOR,
};
pub use page::Page;
pub use request::{event_alias, load_alias, EventRequest, Intercept, LoadRequest};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural role of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentKind {
    /// Whole page
    Page,
    /// Form aggregate
    Form,
    /// Input-like field
    Field,
    /// Clickable button or link
    Button,
    /// Paginated table
    Datatable,
    /// Datatable column
    Column,
    /// Chart or canvas
    Graph,
    /// Dropdown or option list
    Menu,
    /// Anything else
    Generic,
}

impl ComponentKind {
    /// Upper-case tag, e.g. `DATATABLE`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "PAGE",
            Self::Form => "FORM",
            Self::Field => "FIELD",
            Self::Button => "BUTTON",
            Self::Datatable => "DATATABLE",
            Self::Column => "COLUMN",
            Self::Graph => "GRAPH",
            Self::Menu => "MENU",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content language of a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    /// English
    #[default]
    En,
    /// French
    Fr,
}

/// A child component, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Plain component
    Generic(Component),
    /// Button
    Button(Button),
    /// Field
    Field(Field),
    /// Form
    Form(Form),
    /// Datatable
    Datatable(Datatable),
    /// Datatable column
    Column(Column),
    /// Graph
    Graph(Graph),
    /// Menu
    Menu(Menu),
}

impl Child {
    /// Shared base component
    #[must_use]
    pub fn base(&self) -> &Component {
        match self {
            Self::Generic(c) => c,
            Self::Button(c) => c,
            Self::Field(c) => c,
            Self::Form(c) => c,
            Self::Datatable(c) => c,
            Self::Column(c) => c,
            Self::Graph(c) => c,
            Self::Menu(c) => c,
        }
    }

    /// Shared base component, mutably
    pub fn base_mut(&mut self) -> &mut Component {
        match self {
            Self::Generic(c) => c,
            Self::Button(c) => c,
            Self::Field(c) => c,
            Self::Form(c) => c,
            Self::Datatable(c) => c,
            Self::Column(c) => c,
            Self::Graph(c) => c,
            Self::Menu(c) => c,
        }
    }

    /// Kind of the wrapped component
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.base().kind()
    }

    /// Name of the wrapped component
    #[must_use]
    pub fn name(&self) -> &str {
        self.base().name()
    }

    /// Dynamic view for action dispatch
    #[must_use]
    pub fn as_actionable(&self) -> &dyn Actionable {
        match self {
            Self::Generic(c) => c,
            Self::Button(c) => c,
            Self::Field(c) => c,
            Self::Form(c) => c,
            Self::Datatable(c) => c,
            Self::Column(c) => c,
            Self::Graph(c) => c,
            Self::Menu(c) => c,
        }
    }
}

macro_rules! child_variant {
    ($ty:ident, $as_ref:ident, $as_mut:ident) => {
        impl From<$ty> for Child {
            fn from(component: $ty) -> Self {
                Self::$ty(component)
            }
        }

        impl Child {
            #[doc = concat!("The wrapped [`", stringify!($ty), "`], if this child is one")]
            #[must_use]
            pub const fn $as_ref(&self) -> Option<&$ty> {
                match self {
                    Self::$ty(c) => Some(c),
                    _ => None,
                }
            }

            #[doc = concat!("The wrapped [`", stringify!($ty), "`], mutably")]
            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Self::$ty(c) => Some(c),
                    _ => None,
                }
            }
        }
    };
}

child_variant!(Button, as_button, as_button_mut);
child_variant!(Field, as_field, as_field_mut);
child_variant!(Form, as_form, as_form_mut);
child_variant!(Datatable, as_datatable, as_datatable_mut);
child_variant!(Column, as_column, as_column_mut);
child_variant!(Graph, as_graph, as_graph_mut);
child_variant!(Menu, as_menu, as_menu_mut);

impl From<Component> for Child {
    fn from(component: Component) -> Self {
        Self::Generic(component)
    }
}

/// Deref a specialization to its `base` component and give it the default
/// [`Actionable`] behaviour.
macro_rules! specialization {
    ($ty:ident) => {
        impl std::ops::Deref for $ty {
            type Target = $crate::component::Component;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }

        impl std::ops::DerefMut for $ty {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.base
            }
        }
    };
    ($ty:ident, default_actions) => {
        $crate::component::specialization!($ty);

        impl $crate::component::Actionable for $ty {
            fn component(&self) -> &$crate::component::Component {
                &self.base
            }
        }
    };
}

pub(crate) use specialization;
