//! Test fixtures - small repositories for each supported stack.

use std::path::Path;

pub const FLASK_APP: &str = r#"import os
from flask import Flask

app = Flask(__name__)
SECRET = os.environ.get('SECRET_KEY')

@app.route("/")
def index():
    return "ok"

if __name__ == "__main__":
    app.run(host="0.0.0.0", port=5000)
"#;

/// Flask application without a database
pub const FLASK_REPO: &[(&str, &str)] = &[
    ("app.py", FLASK_APP),
    ("requirements.txt", "flask==3.0.0\ngunicorn>=21\n"),
];

/// Flask application backed by PostgreSQL
pub const FLASK_POSTGRES_REPO: &[(&str, &str)] = &[
    ("app.py", FLASK_APP),
    (
        "requirements.txt",
        "# web\nflask==3.0.0\npsycopg2-binary==2.9.9\n",
    ),
    (".env.example", "DATABASE_URL=postgres://localhost/app\n"),
];

pub const EXPRESS_SERVER: &str = r#"const express = require('express');
const app = express();
const port = process.env.PORT || 3000;

app.get('/', (req, res) => res.send('ok'));
app.listen(port);
"#;

/// Express application using MongoDB and Redis
pub const EXPRESS_MONGO_REPO: &[(&str, &str)] = &[
    ("server.js", EXPRESS_SERVER),
    (
        "package.json",
        r#"{
  "name": "shop",
  "scripts": { "start": "node server.js" },
  "dependencies": { "express": "^4.18.0", "mongoose": "^8.0.0", "ioredis": "^5.3.0" }
}
"#,
    ),
];

/// Write `files` (relative path, content) under `root`
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dir");
        }
        std::fs::write(&path, content).expect("write fixture file");
    }
}
