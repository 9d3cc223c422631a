use std::sync::Arc;

use bindery::prelude::*;

fn main() {
    register_types();

    bundle::set_one("Logger", Recipe::of_type("ConsoleLogger")).unwrap();
    bundle::set_one("app_name", Recipe::instance("greeter")).unwrap();

    // The facade binds "Greeter" on first use and resolves the rest of the
    // graph through the global registry.
    GreeterFacade::call(|greeter: &EnglishGreeter| greeter.greet()).unwrap();
}

fn register_types() {
    catalog::register(TypeSpec::concrete(
        "ConsoleLogger",
        vec![ParamSpec::typed("app_name", "app_name")],
        |args| {
            let app_name = args.cloned::<&str>("app_name")?;
            Ok(Arc::new(ConsoleLogger { app_name }) as Object)
        },
    ));
    catalog::register(TypeSpec::concrete(
        "EnglishGreeter",
        vec![ParamSpec::typed("logger", "Logger")],
        |args| {
            let logger = args.arc::<ConsoleLogger>("logger")?;
            Ok(Arc::new(EnglishGreeter { logger }) as Object)
        },
    ));
}

struct ConsoleLogger {
    app_name: &'static str,
}

impl ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

struct EnglishGreeter {
    logger: Arc<ConsoleLogger>,
}

impl EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

struct GreeterFacade;

impl Facade for GreeterFacade {
    fn call_name() -> &'static str {
        "Greeter"
    }

    fn call_target() -> Recipe {
        Recipe::of_type("EnglishGreeter")
    }
}
