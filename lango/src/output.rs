use std::cell::RefCell;

/// Destination for `print`.
#[derive(Debug, Default)]
pub enum PrintHandler {
    /// Write each line to standard output.
    #[default]
    Stdout,

    /// Collect lines in memory.
    Buffer(RefCell<String>),

    /// Discard everything.
    Silent,
}

impl PrintHandler {
    pub fn buffer() -> PrintHandler {
        PrintHandler::Buffer(RefCell::new(String::new()))
    }

    pub fn println(&self, line: &str) {
        match self {
            Self::Stdout => println!("{}", line),
            Self::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(line);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Everything collected so far. Empty unless buffering.
    pub fn contents(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.borrow().clone(),
            _ => String::new(),
        }
    }
}
