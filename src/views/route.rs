use std::fmt;

/// A location in the application, parsed from a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Test,
    /// Raw path parameter; validated when the detail view mounts.
    Student(String),
    Error,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        match path {
            "/" | "" => Route::List,
            "/test" => Route::Test,
            "/error" => Route::Error,
            _ => match path.strip_prefix("/student/") {
                Some(param) if !param.contains('/') => Route::Student(param.to_string()),
                _ => Route::Error,
            },
        }
    }

    pub fn student(id: i64) -> Route {
        Route::Student(id.to_string())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::List => "Students",
            Route::Test => "Test",
            Route::Student(_) => "Student",
            Route::Error => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List => f.write_str("/"),
            Route::Test => f.write_str("/test"),
            Route::Student(param) => write!(f, "/student/{param}"),
            Route::Error => f.write_str("/error"),
        }
    }
}

/// History stack. The bottom entry is never popped.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> &Route {
        // The stack always holds the start entry.
        &self.stack[self.stack.len() - 1]
    }

    pub fn push(&mut self, route: Route) {
        self.stack.push(route);
    }

    /// Redirect: swap the current entry so "back" skips it.
    pub fn replace(&mut self, route: Route) {
        if let Some(top) = self.stack.last_mut() {
            *top = route;
        }
    }

    /// Returns `false` when already at the first entry.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
