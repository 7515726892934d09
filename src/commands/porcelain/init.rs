use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let twig_dir = self.twig_dir();
        if twig_dir.exists() {
            writeln!(self.writer(), "Twig repository already exists")?;
            return Ok(());
        }

        std::fs::create_dir_all(twig_dir.join("objects"))?;
        std::fs::create_dir_all(twig_dir.join("refs").join("heads"))?;
        self.refs().init_head()?;

        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
