use datamirror::HandlerRegistry;

pub fn run(registry: &HandlerRegistry) {
    for name in registry.names() {
        println!("{name}");
    }
}
