/// A `/* ... */` comment, text kept without the delimiters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
    line_no: usize,
}

impl Comment {
    pub fn new(text: impl Into<String>, line_no: usize) -> Self {
        return Self {
            text: text.into(),
            line_no,
        };
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self) -> String {
        return format!("/*{}*/", self.text);
    }
}

/// Nodes that keep the comments written in front of them
pub trait Commentable {
    fn comments(&self) -> &[Comment];
    fn comments_mut(&mut self) -> &mut Vec<Comment>;

    fn add_comments(&mut self, comments: Vec<Comment>) {
        self.comments_mut().extend(comments);
    }

    fn set_comments(&mut self, comments: Vec<Comment>) {
        *self.comments_mut() = comments;
    }
}
