use crate::{error::NavigationError, models::FileEntry};

pub const ROOT_FOLDER_ID: &str = "root";
pub const ROOT_FOLDER_NAME: &str = "My Drive";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderStackEntry {
    pub id: String,
    pub name: String,
}

impl FolderStackEntry {
    pub fn root() -> Self {
        Self {
            id: ROOT_FOLDER_ID.into(),
            name: ROOT_FOLDER_NAME.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListScope {
    pub folder_id: String,
    pub search_query: String,
}

impl ListScope {
    pub fn is_search(&self) -> bool {
        !self.search_query.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Navigation {
    root: FolderStackEntry,
    opened: Vec<FolderStackEntry>,
    search_query: String,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    pub fn new() -> Self {
        Self {
            root: FolderStackEntry::root(),
            opened: Vec::new(),
            search_query: String::new(),
        }
    }

    pub fn stack(&self) -> Vec<FolderStackEntry> {
        std::iter::once(&self.root)
            .chain(&self.opened)
            .cloned()
            .collect()
    }

    pub fn current_folder(&self) -> &FolderStackEntry {
        self.opened.last().unwrap_or(&self.root)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn can_go_back(&self) -> bool {
        !self.opened.is_empty()
    }

    pub fn open_folder(&mut self, entry: &FileEntry) -> Result<(), NavigationError> {
        if !entry.is_folder() {
            return Err(NavigationError::NotAFolder(entry.name.clone()));
        }
        self.opened.push(FolderStackEntry {
            id: entry.id.clone(),
            name: entry.name.clone(),
        });
        self.search_query.clear();
        Ok(())
    }

    pub fn go_back(&mut self) -> Result<(), NavigationError> {
        if !self.can_go_back() {
            return Err(NavigationError::AtRoot);
        }
        self.opened.pop();
        self.search_query.clear();
        Ok(())
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }

    pub fn scope(&self) -> ListScope {
        ListScope {
            folder_id: self.current_folder().id.clone(),
            search_query: self.search_query.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FOLDER_MIME_TYPE;

    fn folder(id: &str) -> FileEntry {
        FileEntry {
            id: id.into(),
            name: format!("Folder {id}"),
            mime_type: FOLDER_MIME_TYPE.into(),
        }
    }

    fn text_file(id: &str) -> FileEntry {
        FileEntry {
            id: id.into(),
            name: format!("{id}.txt"),
            mime_type: "text/plain".into(),
        }
    }

    #[test]
    fn starts_at_my_drive() {
        let nav = Navigation::new();
        assert_eq!(nav.stack(), vec![FolderStackEntry::root()]);
        assert_eq!(nav.current_folder().name, "My Drive");
        assert_eq!(
            nav.scope(),
            ListScope {
                folder_id: "root".into(),
                search_query: String::new()
            }
        );
    }

    #[test]
    fn opening_a_folder_pushes_and_clears_search() {
        let mut nav = Navigation::new();
        nav.set_search("budget");
        nav.open_folder(&folder("a")).unwrap();
        assert_eq!(nav.current_folder().id, "a");
        assert_eq!(nav.search_query(), "");
        assert!(nav.can_go_back());
    }

    #[test]
    fn files_cannot_be_opened_as_folders() {
        let mut nav = Navigation::new();
        let err = nav.open_folder(&text_file("x")).unwrap_err();
        assert_eq!(err, NavigationError::NotAFolder("x.txt".into()));
        assert_eq!(nav.stack().len(), 1);
    }

    #[test]
    fn back_at_root_is_refused() {
        let mut nav = Navigation::new();
        nav.set_search("keep me");
        assert_eq!(nav.go_back(), Err(NavigationError::AtRoot));
        assert_eq!(nav.search_query(), "keep me");
    }

    #[test]
    fn back_pops_and_clears_search() {
        let mut nav = Navigation::new();
        nav.open_folder(&folder("a")).unwrap();
        nav.open_folder(&folder("b")).unwrap();
        nav.set_search("q");
        nav.go_back().unwrap();
        assert_eq!(nav.current_folder().id, "a");
        assert_eq!(nav.search_query(), "");
    }

    #[test]
    fn unwinding_every_folder_lands_on_root() {
        let mut nav = Navigation::new();
        nav.open_folder(&folder("a")).unwrap();
        nav.open_folder(&folder("b")).unwrap();
        nav.go_back().unwrap();
        nav.go_back().unwrap();

        assert_eq!(nav.current_folder(), &FolderStackEntry::root());
        assert_eq!(nav.stack(), vec![FolderStackEntry::root()]);
        assert!(!nav.can_go_back());
        assert_eq!(nav.go_back(), Err(NavigationError::AtRoot));
    }

    #[test]
    fn search_keeps_folder_in_scope_params() {
        let mut nav = Navigation::new();
        nav.open_folder(&folder("a")).unwrap();
        nav.set_search("O'Brien");
        let scope = nav.scope();
        assert_eq!(scope.folder_id, "a");
        assert!(scope.is_search());
        assert_eq!(nav.stack().len(), 2);
    }

    #[test]
    fn stack_stays_rooted_under_every_sequence() {
        // every sequence of six steps drawn from four transitions
        const STEPS: u32 = 6;
        for mut code in 0..4u32.pow(STEPS) {
            let mut nav = Navigation::new();
            for step in 0..STEPS {
                let _ = match code % 4 {
                    0 => nav.open_folder(&folder(&format!("f{step}"))),
                    1 => nav.open_folder(&text_file(&format!("t{step}"))),
                    2 => nav.go_back(),
                    _ => {
                        nav.set_search(format!("q{step}"));
                        Ok(())
                    }
                };
                code /= 4;

                assert!(!nav.stack().is_empty());
                assert_eq!(nav.stack()[0], FolderStackEntry::root());
                assert_eq!(nav.scope().folder_id, nav.current_folder().id);
            }
        }
    }
}
