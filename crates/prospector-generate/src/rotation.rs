//! Deterministic template rotation for the fallback generator.
//!
//! Each resource list is walked by its own round-robin cursor, so slot `i`
//! always pairs `terms[i % |terms|]` with `locations[i % |locations|]` and so
//! on. The sequence is lazy and can be restarted at any slot.

/// Fixed query templates, selected by `i % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate {
    /// `site:{tld} "{term}" "{location}" "@{email}"`
    SiteTargeted,
    /// `"{term}" "{location}" "@{email}" contact`
    Contact,
    /// `filetype:pdf "{term}" "{location}" "@{email}"`
    Document,
}

impl QueryTemplate {
    pub const ALL: [QueryTemplate; 3] = [Self::SiteTargeted, Self::Contact, Self::Document];

    pub fn render(&self, slot: &Slot<'_>) -> String {
        let Slot {
            term,
            location,
            email,
            tld,
            ..
        } = slot;
        match self {
            Self::SiteTargeted => format!(r#"site:{} "{}" "{}" "@{}""#, tld, term, location, email),
            Self::Contact => format!(r#""{}" "{}" "@{}" contact"#, term, location, email),
            Self::Document => format!(r#"filetype:pdf "{}" "{}" "@{}""#, term, location, email),
        }
    }
}

/// Infinite cyclic cursor over a slice.
#[derive(Debug, Clone)]
pub struct RoundRobin<'a, T> {
    items: &'a [T],
    cursor: usize,
}

impl<'a, T> RoundRobin<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self::starting_at(items, 0)
    }

    pub fn starting_at(items: &'a [T], offset: usize) -> Self {
        let cursor = if items.is_empty() { 0 } else { offset % items.len() };
        Self { items, cursor }
    }
}

impl<'a, T> Iterator for RoundRobin<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.cursor)?;
        self.cursor = (self.cursor + 1) % self.items.len();
        Some(item)
    }
}

/// One filled slot of the fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    pub index: usize,
    pub term: &'a str,
    pub location: &'a str,
    pub email: &'a str,
    pub tld: &'a str,
    pub template: QueryTemplate,
}

impl Slot<'_> {
    pub fn render(&self) -> String {
        self.template.render(self)
    }
}

/// Resource lists for the fallback sequence.
#[derive(Debug, Clone)]
pub struct FallbackResources {
    pub terms: Vec<String>,
    pub locations: Vec<String>,
    pub providers: Vec<String>,
    pub tlds: Vec<String>,
}

impl FallbackResources {
    /// Whether every list can supply a value.
    pub fn is_complete(&self) -> bool {
        !self.terms.is_empty()
            && !self.locations.is_empty()
            && !self.providers.is_empty()
            && !self.tlds.is_empty()
    }

    pub fn sequence(&self) -> FallbackSequence<'_> {
        FallbackSequence::starting_at(self, 0)
    }
}

/// Lazy, restartable sequence of fallback slots.
///
/// Yields nothing if any resource list is empty.
#[derive(Debug, Clone)]
pub struct FallbackSequence<'a> {
    index: usize,
    complete: bool,
    terms: RoundRobin<'a, String>,
    locations: RoundRobin<'a, String>,
    providers: RoundRobin<'a, String>,
    tlds: RoundRobin<'a, String>,
    templates: RoundRobin<'static, QueryTemplate>,
}

impl<'a> FallbackSequence<'a> {
    pub fn starting_at(resources: &'a FallbackResources, offset: usize) -> Self {
        Self {
            index: offset,
            complete: resources.is_complete(),
            terms: RoundRobin::starting_at(&resources.terms, offset),
            locations: RoundRobin::starting_at(&resources.locations, offset),
            providers: RoundRobin::starting_at(&resources.providers, offset),
            tlds: RoundRobin::starting_at(&resources.tlds, offset),
            templates: RoundRobin::starting_at(&QueryTemplate::ALL, offset),
        }
    }
}

impl<'a> Iterator for FallbackSequence<'a> {
    type Item = Slot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.complete {
            return None;
        }
        let slot = Slot {
            index: self.index,
            term: self.terms.next()?,
            location: self.locations.next()?,
            email: self.providers.next()?,
            tld: self.tlds.next()?,
            template: *self.templates.next()?,
        };
        self.index += 1;
        Some(slot)
    }
}
