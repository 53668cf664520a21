//! Menu search and filter state with host notifications.

/// Receives every filter change. The filter itself never queries the menu.
pub trait MenuFilterHost {
    fn on_search(&mut self, query: &str);

    /// `None` selects all categories.
    fn on_category_filter(&mut self, category: Option<&str>);

    /// `Some(true)` vegetarian only, `Some(false)` non-vegetarian only, `None` both.
    fn on_veg_filter(&mut self, veg: Option<bool>);
}

pub struct MenuFilter<H: MenuFilterHost> {
    host: H,
    categories: Vec<String>,
    query: String,
    category: Option<String>,
    veg: Option<bool>,
}

impl<H: MenuFilterHost> MenuFilter<H> {
    pub fn new(host: H, categories: Vec<String>) -> Self {
        Self {
            host,
            categories,
            query: String::new(),
            category: None,
            veg: None,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn veg(&self) -> Option<bool> {
        self.veg
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn search(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.host.on_search(&self.query);
    }

    /// Selects a category; `None` or an empty name means all. Names outside the
    /// offered list are forwarded as given.
    pub fn select_category(&mut self, category: Option<&str>) {
        self.category = category.filter(|name| !name.is_empty()).map(str::to_string);
        self.host.on_category_filter(self.category.as_deref());
    }

    pub fn set_veg(&mut self, veg: Option<bool>) {
        self.veg = veg;
        self.host.on_veg_filter(veg);
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl MenuFilterHost for Recorder {
        fn on_search(&mut self, query: &str) {
            self.events.push(format!("search:{query}"));
        }

        fn on_category_filter(&mut self, category: Option<&str>) {
            self.events
                .push(format!("category:{}", category.unwrap_or("*")));
        }

        fn on_veg_filter(&mut self, veg: Option<bool>) {
            self.events.push(format!("veg:{veg:?}"));
        }
    }

    fn filter() -> MenuFilter<Recorder> {
        MenuFilter::new(
            Recorder::default(),
            vec!["Starters".into(), "Mains".into()],
        )
    }

    #[test]
    fn every_change_reaches_the_host() {
        let mut filter = filter();
        filter.search("paneer");
        filter.select_category(Some("Mains"));
        filter.set_veg(Some(true));
        filter.set_veg(None);
        assert_eq!(filter.query(), "paneer");
        assert_eq!(filter.selected_category(), Some("Mains"));
        assert_eq!(filter.veg(), None);
        assert_eq!(
            filter.into_host().events,
            vec![
                "search:paneer",
                "category:Mains",
                "veg:Some(true)",
                "veg:None"
            ]
        );
    }

    #[test]
    fn empty_category_means_all() {
        let mut filter = filter();
        filter.select_category(Some("Starters"));
        filter.select_category(Some(""));
        assert_eq!(filter.selected_category(), None);
        assert_eq!(filter.host().events.last().map(String::as_str), Some("category:*"));
        assert_eq!(filter.categories().len(), 2);
    }
}
